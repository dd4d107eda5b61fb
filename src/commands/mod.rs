pub mod extract;
pub mod latest;
