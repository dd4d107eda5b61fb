//! Internal implementation for the extraction pipeline.
//!
//! Not exposed in public interface.

use std::collections::HashSet;

use log::{debug, info, warn};

use super::RunOutcome;
use crate::client::RequestClient;
use crate::comments::CommentFetcher;
use crate::config::RunConfig;
use crate::export::{self, ExportOptions, ExportResult, RunStamp};
use crate::filter::Verdict;
use crate::normalize;
use crate::pacing::Sleeper;
use crate::walker::PageWalker;

pub(super) fn run(
    config: &RunConfig,
    client: &dyn RequestClient,
    sleeper: &dyn Sleeper,
) -> RunOutcome {
    let fetcher = CommentFetcher::new(client, sleeper, &config.project, config.comments);
    let walker = PageWalker::new(client, sleeper, config);

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut filtered_out = 0;
    let mut duplicates = Vec::new();
    let mut comment_failures = Vec::new();

    let walk = walker.walk(|page, items| {
        for raw in &items {
            let iid = normalize::upstream_iid(raw);
            let issue = normalize::issue(raw);

            match config.labels.verdict(&issue.labels) {
                Verdict::Keep => {}
                verdict => {
                    debug!("Issue #{} dropped: {:?}", issue.iid, verdict);
                    filtered_out += 1;
                    continue;
                }
            }

            let Some(iid) = iid else {
                // Without an iid there is nothing to dedupe on or fetch notes for.
                warn!("Issue id {} has no iid, keeping it without comments", issue.id);
                issues.push(issue);
                continue;
            };

            if !seen.insert(iid) {
                warn!("Issue #{} seen again on page {}, skipping", iid, page);
                duplicates.push(iid);
                continue;
            }

            let (issue, failure) = fetcher.attach(issue);
            if let Some(failure) = failure {
                comment_failures.push(failure);
            }
            issues.push(issue);
        }
        info!("Collected {} issues so far", issues.len());
    });

    RunOutcome {
        issues,
        pages_fetched: walk.pages_fetched,
        end: walk.end,
        comment_failures,
        filtered_out,
        duplicates,
    }
}

pub(super) fn export(config: &RunConfig, outcome: &RunOutcome, stamp: RunStamp) -> Vec<ExportResult> {
    if outcome.issues.is_empty() {
        warn!("No issues extracted, skipping export");
        return Vec::new();
    }
    let opts = ExportOptions::for_run(config, stamp);
    export::write_all(&config.formats, &outcome.issues, &opts, &config.output_dir)
}
