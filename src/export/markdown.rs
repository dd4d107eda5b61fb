//! Detailed human-readable report with full descriptions and threads.

use std::fmt::{Display, Write};

use serde_json::Value;

use super::{timestamp, RunStamp};
use crate::model::Issue;

pub(super) fn render(issues: &[Issue], stamp: &RunStamp) -> String {
    let mut out = String::new();
    out.push_str("# GitLab Issues - Detailed Report\n\n");
    let _ = writeln!(out, "**Extracted at:** {}", stamp.display());
    let _ = writeln!(out, "**Total issues:** {}\n", issues.len());

    for issue in issues {
        render_issue(&mut out, issue);
    }
    out
}

fn render_issue(out: &mut String, issue: &Issue) {
    let _ = writeln!(out, "## Issue #{}: {}\n", issue.iid, issue.title);
    let _ = writeln!(out, "**State:** {}", issue.state);
    let _ = writeln!(
        out,
        "**Author:** {} (@{})",
        issue.author_name(),
        issue.author_username()
    );
    let _ = writeln!(out, "**Created:** {}", timestamp(issue.created_at.as_ref()));
    let _ = writeln!(out, "**Updated:** {}", timestamp(issue.updated_at.as_ref()));
    let _ = writeln!(out, "**Closed:** {}", timestamp(issue.closed_at.as_ref()));
    let _ = writeln!(out, "**URL:** {}", issue.web_url);
    let _ = writeln!(out, "**ID:** {}", issue.id);
    let _ = writeln!(out, "**References:** {}", references(issue.references.as_ref()));

    if !issue.labels.is_empty() {
        let _ = writeln!(out, "**Labels:** {}", issue.labels.join(", "));
    }
    if !issue.assignees.is_empty() {
        let _ = writeln!(out, "**Assignees:** {}", issue.assignees.join(", "));
    }
    let _ = writeln!(
        out,
        "**Milestone:** {}",
        or_dash(issue.milestone.as_ref().map(|m| &m.title))
    );
    let _ = writeln!(
        out,
        "**Due:** {}",
        or_dash(issue.due_date.map(|d| d.format("%Y-%m-%d")))
    );
    let _ = writeln!(out, "**Weight:** {}", or_dash(issue.weight));
    let _ = writeln!(out, "**Confidential:** {}", issue.confidential);
    let _ = writeln!(
        out,
        "**Discussion locked:** {}",
        or_dash(issue.discussion_locked)
    );
    let _ = writeln!(out, "**Has tasks:** {}", issue.has_tasks);
    let _ = writeln!(out, "**Task status:** {}", or_dash(issue.task_status.as_ref()));
    let _ = writeln!(
        out,
        "**Votes:** +{} / -{} | **Notes:** {} | **Merge requests:** {}",
        issue.upvotes, issue.downvotes, issue.user_notes_count, issue.merge_requests_count
    );

    out.push_str("\n### Description\n\n");
    match issue.description.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            let _ = writeln!(out, "{}\n", text);
        }
        _ => out.push_str("*No description*\n\n"),
    }

    if !issue.comments.is_empty() {
        let _ = writeln!(out, "### Comments ({})\n", issue.comments.len());
        for (i, comment) in issue.comments.iter().enumerate() {
            let _ = writeln!(
                out,
                "#### Comment {} - {} (@{})",
                i + 1,
                comment.author_name(),
                comment.author_username()
            );
            let _ = writeln!(out, "*{}*\n", timestamp(comment.created_at.as_ref()));
            let _ = writeln!(out, "{}\n", comment.body);
        }
    }

    out.push_str("---\n\n");
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// `full` reference when upstream sent the usual object, else compact JSON.
fn references(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(refs) => refs
            .get("full")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| refs.to_string()),
    }
}
