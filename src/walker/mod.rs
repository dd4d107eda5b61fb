//! Sequential pagination over the project issues endpoint.
//!
//! "Do X": Fetch issue pages one at a time, paced, until a stop condition.
//!
//! States: Fetching -> Accumulating -> (Fetching | Done), or Fetching ->
//! Aborted on a `NetworkError`. A run stops when a page is empty, when a
//! page holds fewer than `PAGE_SIZE` items, or when the next page would
//! exceed `max_pages`. Pages handed to the caller before an abort stay with
//! the caller.
//!
//! Pages are never fetched concurrently; the pause between them is the
//! rate-limit contract with upstream.
//!
//! # Example
//!
//! ```ignore
//! use glean::walker::PageWalker;
//!
//! let walker = PageWalker::new(&client, &ThreadSleeper, &config);
//! let outcome = walker.walk(|page, items| println!("page {}: {}", page, items.len()));
//! ```

mod internal;

use serde_json::Value;

use crate::client::{NetworkError, RequestClient};
use crate::config::RunConfig;
use crate::pacing::Sleeper;

/// Items requested per page. Fixed; a shorter page means the last page.
pub const PAGE_SIZE: usize = 50;

/// Why a walk finished normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page came back with no items.
    EmptyPage { page: u32 },
    /// The page held fewer than `PAGE_SIZE` items.
    ShortPage { page: u32, items: usize },
    /// The configured page budget was used up.
    MaxPages { max: u32 },
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EmptyPage { page } => write!(f, "page {} was empty", page),
            StopReason::ShortPage { page, items } => {
                write!(f, "page {} was the last ({} items)", page, items)
            }
            StopReason::MaxPages { max } => write!(f, "reached the {}-page limit", max),
        }
    }
}

/// Terminal state of a walk.
#[derive(Debug)]
pub enum WalkEnd {
    Done(StopReason),
    /// Fetching `page` failed; earlier pages were already delivered.
    Aborted { page: u32, error: NetworkError },
}

#[derive(Debug)]
pub struct WalkOutcome {
    /// Successful page requests, including a final empty page.
    pub pages_fetched: u32,
    pub end: WalkEnd,
}

/// Drives the page loop for one run.
pub struct PageWalker<'a> {
    client: &'a dyn RequestClient,
    sleeper: &'a dyn Sleeper,
    config: &'a RunConfig,
}

impl<'a> PageWalker<'a> {
    pub fn new(
        client: &'a dyn RequestClient,
        sleeper: &'a dyn Sleeper,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            client,
            sleeper,
            config,
        }
    }

    /// Walk pages in server order, handing each non-empty page to `on_page`.
    pub fn walk<F>(&self, on_page: F) -> WalkOutcome
    where
        F: FnMut(u32, Vec<Value>),
    {
        internal::walk(self.client, self.sleeper, self.config, on_page)
    }
}
