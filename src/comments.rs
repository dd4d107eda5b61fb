//! Discussion thread retrieval.
//!
//! "Do X": Attach non-system notes to issues that have any.
//!
//! Whether threads are fetched at all is a `CommentPolicy` chosen once when
//! the run is configured. A failed nested fetch is recovered here: the issue
//! keeps an empty thread and the failure is handed back for reporting.

use std::time::Duration;

use log::{info, warn};

use crate::client::{self, NetworkError, RequestClient};
use crate::model::{Comment, Issue};
use crate::normalize;
use crate::pacing::Sleeper;

/// Pause after each nested notes request. Shorter than the page delay.
pub const COMMENT_DELAY: Duration = Duration::from_millis(500);

/// Notes requested in one call; upstream caps `per_page` at 100.
pub const NOTES_PER_PAGE: usize = 100;

/// Whether a run retrieves discussion threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPolicy {
    FetchAll,
    SkipAll,
}

/// A nested fetch that failed; the issue was kept with no comments.
#[derive(Debug)]
pub struct CommentFailure {
    pub iid: u64,
    pub error: NetworkError,
}

pub struct CommentFetcher<'a> {
    client: &'a dyn RequestClient,
    sleeper: &'a dyn Sleeper,
    project: &'a str,
    policy: CommentPolicy,
}

impl<'a> CommentFetcher<'a> {
    pub fn new(
        client: &'a dyn RequestClient,
        sleeper: &'a dyn Sleeper,
        project: &'a str,
        policy: CommentPolicy,
    ) -> Self {
        Self {
            client,
            sleeper,
            project,
            policy,
        }
    }

    /// True only for `FetchAll` and an issue with at least one user note.
    pub fn wants(&self, issue: &Issue) -> bool {
        self.policy == CommentPolicy::FetchAll && issue.user_notes_count > 0
    }

    /// Return the issue with its thread attached.
    ///
    /// Issues the fetcher does not want come back untouched. On failure the
    /// issue comes back with an empty thread alongside the failure.
    pub fn attach(&self, issue: Issue) -> (Issue, Option<CommentFailure>) {
        if !self.wants(&issue) {
            return (issue, None);
        }

        info!(
            "  Fetching {} comments for issue #{}...",
            issue.user_notes_count, issue.iid
        );
        let fetched = self.fetch(issue.iid);
        self.sleeper.sleep(COMMENT_DELAY);

        match fetched {
            Ok(comments) => (issue.with_comments(comments), None),
            Err(error) => {
                warn!("Comments for issue #{} unavailable: {}", issue.iid, error);
                let iid = issue.iid;
                (issue.with_comments(Vec::new()), Some(CommentFailure { iid, error }))
            }
        }
    }

    fn fetch(&self, iid: u64) -> Result<Vec<Comment>, NetworkError> {
        let query = [
            ("sort", "asc".to_string()),
            ("order_by", "created_at".to_string()),
            ("per_page", NOTES_PER_PAGE.to_string()),
        ];
        let body = self
            .client
            .get_json(&client::notes_path(self.project, iid), &query)?;
        Ok(normalize::comments(&body))
    }
}
