//! Request pacing.
//!
//! No adaptive logic, no rate-limit header parsing. A fixed pause between
//! requests keeps a run under anonymous API limits. Pauses block the thread
//! and are not cancellable once begun.

use std::time::Duration;

/// Something that can pause the current run.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
