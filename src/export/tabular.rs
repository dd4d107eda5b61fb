//! Flat tabular export, one row per issue.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Issue;

#[derive(Serialize)]
struct Row<'a> {
    id: u64,
    iid: u64,
    title: &'a str,
    author: &'a str,
    author_username: &'a str,
    state: &'static str,
    created_at: String,
    updated_at: String,
    closed_at: String,
    labels: String,
    assignees: String,
    web_url: &'a str,
    user_notes_count: u64,
    upvotes: u64,
    downvotes: u64,
    merge_requests_count: u64,
    confidential: bool,
    due_date: Option<String>,
    weight: Option<i64>,
    description_preview: String,
    milestone_title: &'a str,
}

impl<'a> Row<'a> {
    fn from_issue(issue: &'a Issue, preview_len: usize) -> Self {
        Self {
            id: issue.id,
            iid: issue.iid,
            title: &issue.title,
            author: issue.author_name(),
            author_username: issue.author_username(),
            state: issue.state.as_str(),
            created_at: optional_time(issue.created_at.as_ref()),
            updated_at: optional_time(issue.updated_at.as_ref()),
            closed_at: optional_time(issue.closed_at.as_ref()),
            labels: issue.labels.join("; "),
            assignees: issue.assignees.join("; "),
            web_url: &issue.web_url,
            user_notes_count: issue.user_notes_count,
            upvotes: issue.upvotes,
            downvotes: issue.downvotes,
            merge_requests_count: issue.merge_requests_count,
            confidential: issue.confidential,
            due_date: issue.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            weight: issue.weight,
            description_preview: description_preview(issue.description.as_deref(), preview_len),
            milestone_title: issue
                .milestone
                .as_ref()
                .map(|m| m.title.as_str())
                .unwrap_or(""),
        }
    }
}

fn optional_time(ts: Option<&DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_default()
}

/// First `bound` characters of the description, `...` appended when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
fn description_preview(description: Option<&str>, bound: usize) -> String {
    let text = description.unwrap_or("");
    match text.char_indices().nth(bound) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub(super) fn render(issues: &[Issue], preview_len: usize) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if issues.is_empty() {
        // serialize() only emits the header alongside the first record.
        writer.write_record(HEADER)?;
    }
    for issue in issues {
        writer.serialize(Row::from_issue(issue, preview_len))?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

const HEADER: [&str; 21] = [
    "id",
    "iid",
    "title",
    "author",
    "author_username",
    "state",
    "created_at",
    "updated_at",
    "closed_at",
    "labels",
    "assignees",
    "web_url",
    "user_notes_count",
    "upvotes",
    "downvotes",
    "merge_requests_count",
    "confidential",
    "due_date",
    "weight",
    "description_preview",
    "milestone_title",
];
