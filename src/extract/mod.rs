//! One extraction run, end to end.
//!
//! "Do X": Walk pages, normalize, filter, attach threads, export.
//!
//! `run` is the pure pipeline over injected seams and returns what was
//! gathered plus how the walk ended. `execute` wires the real HTTP client
//! and thread sleeper, runs the pipeline and writes artifacts. The CLI is a
//! thin layer over `execute`.
//!
//! Ordering per page: normalize -> label filter -> duplicate guard ->
//! comment fetch -> accumulate. Dropped issues never cost a notes request.
//!
//! # Example
//!
//! ```no_run
//! use glean::config::RunConfig;
//! use glean::extract;
//!
//! let config = RunConfig {
//!     project: "gitlab-org/gitlab".to_string(),
//!     ..Default::default()
//! };
//! let report = extract::execute(&config)?;
//! println!("{} issues", report.outcome.issues.len());
//! # Ok::<(), glean::client::NetworkError>(())
//! ```

mod internal;

use std::path::Path;

use crate::client::{GitLabClient, NetworkError, RequestClient};
use crate::comments::CommentFailure;
use crate::config::RunConfig;
use crate::export::{ExportResult, RunStamp};
use crate::model::Issue;
use crate::pacing::{Sleeper, ThreadSleeper};
use crate::walker::{StopReason, WalkEnd};

/// Everything gathered by one pipeline pass.
#[derive(Debug)]
pub struct RunOutcome {
    /// Kept issues in server order.
    pub issues: Vec<Issue>,
    pub pages_fetched: u32,
    pub end: WalkEnd,
    pub comment_failures: Vec<CommentFailure>,
    /// Issues dropped by the include/exclude stage.
    pub filtered_out: usize,
    /// iids seen more than once; later copies were skipped.
    pub duplicates: Vec<u64>,
}

impl RunOutcome {
    pub fn aborted(&self) -> bool {
        matches!(self.end, WalkEnd::Aborted { .. })
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.end {
            WalkEnd::Done(reason) => Some(reason),
            WalkEnd::Aborted { .. } => None,
        }
    }

    pub fn abort_error(&self) -> Option<&NetworkError> {
        match &self.end {
            WalkEnd::Aborted { error, .. } => Some(error),
            WalkEnd::Done(_) => None,
        }
    }

    pub fn comment_count(&self) -> usize {
        self.issues.iter().map(|i| i.comments.len()).sum()
    }
}

/// How a finished run should be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Issues extracted and the walk ended on a stop condition.
    Complete,
    /// Issues extracted but the walk aborted on a network error.
    Partial,
    /// Nothing extracted; no artifacts were written.
    Empty,
}

/// Outcome plus the artifacts written for it.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub exports: Vec<ExportResult>,
    pub stamp: RunStamp,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if self.outcome.issues.is_empty() {
            RunStatus::Empty
        } else if self.outcome.aborted() {
            RunStatus::Partial
        } else {
            RunStatus::Complete
        }
    }

    /// 0 with issues, 1 without. `strict` turns a partial run into 2.
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self.status() {
            RunStatus::Complete => 0,
            RunStatus::Partial if strict => 2,
            RunStatus::Partial => 0,
            RunStatus::Empty => 1,
        }
    }

    /// Paths of artifacts that were written.
    pub fn artifacts(&self) -> Vec<&Path> {
        self.exports
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().map(|p| p.as_path()))
            .collect()
    }

    pub fn export_failures(&self) -> Vec<&ExportResult> {
        self.exports.iter().filter(|r| r.outcome.is_err()).collect()
    }
}

/// Run the pipeline against injected seams. Never writes files.
pub fn run(config: &RunConfig, client: &dyn RequestClient, sleeper: &dyn Sleeper) -> RunOutcome {
    internal::run(config, client, sleeper)
}

/// Run against the configured instance and write artifacts.
///
/// Fails only when the HTTP client cannot be built. Network failures during
/// the walk end up in the report.
pub fn execute(config: &RunConfig) -> Result<RunReport, NetworkError> {
    let client = GitLabClient::new(&config.base_url)?;
    Ok(execute_with(config, &client, &ThreadSleeper, RunStamp::now()))
}

/// `execute` with explicit seams and run stamp.
pub fn execute_with(
    config: &RunConfig,
    client: &dyn RequestClient,
    sleeper: &dyn Sleeper,
    stamp: RunStamp,
) -> RunReport {
    let outcome = internal::run(config, client, sleeper);
    let exports = internal::export(config, &outcome, stamp);
    RunReport {
        outcome,
        exports,
        stamp,
    }
}
