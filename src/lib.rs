pub mod client;
pub mod comments;
pub mod config;
pub mod export;
pub mod extract;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod pacing;
pub mod paths;
pub mod walker;

// Re-export commonly used types
pub use client::{GitLabClient, NetworkError, RequestClient};
pub use config::{ConfigError, RunConfig};
pub use export::{OutputFormat, SerializationError};
pub use extract::{RunOutcome, RunReport};
pub use model::{Comment, Issue, IssueState};
