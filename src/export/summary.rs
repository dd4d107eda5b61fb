//! Condensed report: counts first, then one short block per issue.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt::Write;

use super::{condense, RunStamp};
use crate::model::Issue;

const REPORT_AUTHORS: usize = 10;
const REPORT_LABELS: usize = 20;
const DESCRIPTION_LIMIT: usize = 150;

/// Tallies over one issue sequence, each sorted by count then name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub by_state: Vec<(String, usize)>,
    pub authors: Vec<(String, usize)>,
    pub labels: Vec<(String, usize)>,
}

impl Stats {
    pub fn collect(issues: &[Issue]) -> Self {
        let mut by_state: HashMap<String, usize> = HashMap::new();
        let mut authors: HashMap<String, usize> = HashMap::new();
        let mut labels: HashMap<String, usize> = HashMap::new();

        for issue in issues {
            *by_state.entry(issue.state.to_string()).or_default() += 1;
            *authors.entry(issue.author_name().to_string()).or_default() += 1;
            for label in &issue.labels {
                *labels.entry(label.clone()).or_default() += 1;
            }
        }

        Self {
            total: issues.len(),
            by_state: ranked(by_state),
            authors: ranked(authors),
            labels: ranked(labels),
        }
    }

    pub fn top_authors(&self, n: usize) -> &[(String, usize)] {
        &self.authors[..n.min(self.authors.len())]
    }

    pub fn top_labels(&self, n: usize) -> &[(String, usize)] {
        &self.labels[..n.min(self.labels.len())]
    }
}

fn ranked(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

pub(super) fn render(issues: &[Issue], stamp: &RunStamp) -> String {
    let stats = Stats::collect(issues);
    let mut out = String::new();

    out.push_str("# GitLab Issues - Summary Report\n\n");
    let _ = writeln!(out, "**Extracted at:** {}", stamp.display());
    let _ = writeln!(out, "**Total issues:** {}\n", stats.total);

    out.push_str("## Statistics\n\n### By State\n");
    for (state, count) in &stats.by_state {
        let _ = writeln!(out, "- **{}:** {} issues", state, count);
    }
    out.push('\n');

    out.push_str("### Top Authors\n");
    for (author, count) in stats.top_authors(REPORT_AUTHORS) {
        let _ = writeln!(out, "- **{}:** {} issues", author, count);
    }
    out.push('\n');

    if !stats.labels.is_empty() {
        out.push_str("### Most Common Labels\n");
        for (label, count) in stats.top_labels(REPORT_LABELS) {
            let _ = writeln!(out, "- **{}:** {} issues", label, count);
        }
        out.push('\n');
    }

    out.push_str("## Issues\n\n");

    // Newest first; undated issues last.
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|issue| Reverse(issue.created_at));

    for (i, issue) in sorted.iter().enumerate() {
        let _ = writeln!(out, "### {}. Issue #{}\n", i + 1, issue.iid);
        let _ = writeln!(out, "**Title:** {}", issue.title);
        let _ = writeln!(
            out,
            "**Author:** {} (@{})",
            issue.author_name(),
            issue.author_username()
        );
        match issue.created_at {
            Some(at) => {
                let _ = writeln!(out, "**Created:** {}", at.format("%Y-%m-%d at %H:%M:%S"));
            }
            None => out.push_str("**Created:** -\n"),
        }
        let _ = writeln!(out, "**URL:** {}", issue.web_url);
        let _ = writeln!(out, "**State:** {}", issue.state.as_str().to_uppercase());
        if !issue.labels.is_empty() {
            let _ = writeln!(out, "**Labels:** {}", issue.labels.join(", "));
        }
        if let Some(text) = issue.description.as_deref().filter(|t| !t.trim().is_empty()) {
            let _ = writeln!(out, "**Description:** {}", condense(text, DESCRIPTION_LIMIT));
        }
        out.push_str("\n---\n\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comment;
    use crate::normalize;
    use chrono::NaiveDate;
    use serde_json::json;

    fn issue(iid: u64, author: &str, created: &str, labels: &[&str]) -> Issue {
        normalize::issue(&json!({
            "iid": iid, "title": format!("issue {}", iid), "state": "opened",
            "author": { "name": author, "username": author.to_lowercase() },
            "created_at": created, "labels": labels
        }))
    }

    fn stamp() -> RunStamp {
        RunStamp::at(
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_stats_rank_by_count_then_name() {
        let issues = vec![
            issue(1, "Bea", "2024-01-01T00:00:00Z", &["bug"]),
            issue(2, "Al", "2024-01-02T00:00:00Z", &["bug", "ux"]),
            issue(3, "Bea", "2024-01-03T00:00:00Z", &["ux"]),
            issue(4, "Cal", "2024-01-04T00:00:00Z", &[]),
        ];
        let stats = Stats::collect(&issues);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_state, vec![("opened".to_string(), 4)]);
        assert_eq!(
            stats.authors,
            vec![
                ("Bea".to_string(), 2),
                ("Al".to_string(), 1),
                ("Cal".to_string(), 1)
            ]
        );
        assert_eq!(stats.top_authors(1), &[("Bea".to_string(), 2)]);
        assert_eq!(
            stats.labels,
            vec![("bug".to_string(), 2), ("ux".to_string(), 2)]
        );
        assert_eq!(stats.top_labels(10).len(), 2);
    }

    #[test]
    fn test_issues_listed_newest_first() {
        let issues = vec![
            issue(1, "A", "2024-01-01T08:00:00Z", &[]),
            issue(2, "A", "2024-03-01T09:15:30Z", &[]),
        ];
        let text = render(&issues, &stamp());
        let newer = text.find("### 1. Issue #2").unwrap();
        let older = text.find("### 2. Issue #1").unwrap();
        assert!(newer < older);
        assert!(text.contains("**Created:** 2024-03-01 at 09:15:30"));
        assert!(text.contains("**State:** OPENED"));
        assert!(!text.contains("### Most Common Labels"));
    }

    #[test]
    fn test_omits_comment_bodies_and_condenses_description() {
        let mut item = issue(5, "A", "2024-01-01T00:00:00Z", &["ops"]);
        item.description = Some(format!("line one\nline two {}", "z".repeat(300)));
        let item = item.with_comments(vec![Comment {
            id: 1,
            body: "secret thread text".to_string(),
            author: None,
            created_at: None,
            updated_at: None,
            resolvable: false,
            resolved: None,
        }]);

        let text = render(&[item], &stamp());
        assert!(!text.contains("secret thread text"));
        assert!(text.contains("**Description:** line one line two z"));
        let line = text
            .lines()
            .find(|l| l.starts_with("**Description:**"))
            .unwrap();
        assert!(line.ends_with("..."));
        assert!(text.contains("- **ops:** 1 issues"));
    }
}
