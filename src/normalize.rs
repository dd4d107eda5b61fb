//! Raw API payload -> canonical `Issue` / `Comment`.
//!
//! "Do X": Absorb upstream payload variability in one place.
//!
//! Reads `serde_json::Value` field by field: missing counters become 0, missing
//! lists become empty, absent nested objects become `None`. Nothing here
//! returns an error. A field with an unexpected type is treated as absent.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::model::{Author, Comment, Issue, IssueState, Milestone, TimeStats};

// ============================================================================
// Issues
// ============================================================================

/// Map one raw issue record. `comments` is always empty here.
pub fn issue(raw: &Value) -> Issue {
    Issue {
        id: count(raw, "id"),
        iid: count(raw, "iid"),
        title: text(raw, "title").unwrap_or_default(),
        description: text(raw, "description"),
        state: state(raw),
        created_at: timestamp(raw, "created_at"),
        updated_at: timestamp(raw, "updated_at"),
        closed_at: timestamp(raw, "closed_at"),
        labels: labels(raw),
        milestone: raw.get("milestone").and_then(milestone),
        assignees: assignees(raw),
        author: raw.get("author").and_then(author),
        web_url: text(raw, "web_url").unwrap_or_default(),
        references: raw.get("references").filter(|v| !v.is_null()).cloned(),
        time_stats: raw.get("time_stats").and_then(time_stats),
        confidential: flag(raw, "confidential").unwrap_or(false),
        discussion_locked: flag(raw, "discussion_locked"),
        due_date: date(raw, "due_date"),
        has_tasks: flag(raw, "has_tasks").unwrap_or(false),
        task_status: text(raw, "task_status"),
        weight: raw.get("weight").and_then(Value::as_i64),
        user_notes_count: count(raw, "user_notes_count"),
        merge_requests_count: count(raw, "merge_requests_count"),
        upvotes: count(raw, "upvotes"),
        downvotes: count(raw, "downvotes"),
        comments: Vec::new(),
    }
}

/// The iid exactly as upstream sent it; `None` when missing or not a number.
pub fn upstream_iid(raw: &Value) -> Option<u64> {
    raw.get("iid").and_then(Value::as_u64)
}

fn state(raw: &Value) -> IssueState {
    match raw.get("state").and_then(Value::as_str) {
        Some("closed") => IssueState::Closed,
        _ => IssueState::Opened,
    }
}

/// Label names. Accepts plain strings and `{ "name": .. }` objects
/// (the `with_labels_details` shape).
fn labels(raw: &Value) -> Vec<String> {
    raw.get("labels")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|label| match label {
                    Value::String(name) => Some(name.clone()),
                    other => text(other, "name"),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Assignee display names; an assignee with neither name nor username is skipped.
fn assignees(raw: &Value) -> Vec<String> {
    raw.get("assignees")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|a| text(a, "name").or_else(|| text(a, "username")))
                .collect()
        })
        .unwrap_or_default()
}

fn author(raw: &Value) -> Option<Author> {
    if !raw.is_object() {
        return None;
    }
    Some(Author {
        name: text(raw, "name").unwrap_or_default(),
        username: text(raw, "username").unwrap_or_default(),
    })
}

fn milestone(raw: &Value) -> Option<Milestone> {
    if !raw.is_object() {
        return None;
    }
    Some(Milestone {
        id: raw.get("id").and_then(Value::as_u64),
        iid: raw.get("iid").and_then(Value::as_u64),
        title: text(raw, "title").unwrap_or_default(),
        state: text(raw, "state"),
        due_date: date(raw, "due_date"),
        web_url: text(raw, "web_url"),
    })
}

fn time_stats(raw: &Value) -> Option<TimeStats> {
    if !raw.is_object() {
        return None;
    }
    Some(TimeStats {
        time_estimate: count(raw, "time_estimate"),
        total_time_spent: count(raw, "total_time_spent"),
        human_time_estimate: text(raw, "human_time_estimate"),
        human_total_time_spent: text(raw, "human_total_time_spent"),
    })
}

// ============================================================================
// Notes
// ============================================================================

/// True for automated notes (state changes, label events, ...).
pub fn is_system_note(raw: &Value) -> bool {
    flag(raw, "system").unwrap_or(false)
}

/// Map one raw note, or `None` for a system note.
pub fn comment(raw: &Value) -> Option<Comment> {
    if is_system_note(raw) {
        return None;
    }
    Some(Comment {
        id: count(raw, "id"),
        body: text(raw, "body").unwrap_or_default(),
        author: raw.get("author").and_then(author),
        created_at: timestamp(raw, "created_at"),
        updated_at: timestamp(raw, "updated_at"),
        resolvable: flag(raw, "resolvable").unwrap_or(false),
        resolved: flag(raw, "resolved"),
    })
}

/// Map a raw notes listing, dropping system notes and keeping upstream order.
pub fn comments(raw: &Value) -> Vec<Comment> {
    raw.as_array()
        .map(|notes| notes.iter().filter_map(comment).collect())
        .unwrap_or_default()
}

// ============================================================================
// Field readers
// ============================================================================

fn text(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn count(raw: &Value, key: &str) -> u64 {
    raw.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn flag(raw: &Value, key: &str) -> Option<bool> {
    raw.get(key).and_then(Value::as_bool)
}

fn timestamp(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    raw.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn date(raw: &Value, key: &str) -> Option<NaiveDate> {
    raw.get(key)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_issue_maps_every_field() {
        let raw = json!({
            "id": 9001,
            "iid": 42,
            "title": "Login fails",
            "description": "Steps to reproduce",
            "state": "closed",
            "created_at": "2024-03-01T10:00:00.000Z",
            "updated_at": "2024-03-02T11:30:00.000+02:00",
            "closed_at": "2024-03-03T09:00:00Z",
            "labels": ["bug", "auth"],
            "milestone": { "id": 7, "iid": 2, "title": "v1.2", "state": "active" },
            "assignees": [{ "name": "Ana", "username": "ana" }, { "username": "bot" }],
            "author": { "name": "Bruno", "username": "bruno" },
            "web_url": "https://gitlab.com/g/p/-/issues/42",
            "references": { "short": "#42", "full": "g/p#42" },
            "time_stats": { "time_estimate": 3600, "total_time_spent": 0 },
            "confidential": true,
            "discussion_locked": null,
            "due_date": "2024-04-01",
            "has_tasks": true,
            "task_status": "1 of 3 checklist items completed",
            "weight": 3,
            "user_notes_count": 5,
            "merge_requests_count": 1,
            "upvotes": 2,
            "downvotes": 1
        });

        let issue = issue(&raw);
        assert_eq!(issue.id, 9001);
        assert_eq!(issue.iid, 42);
        assert_eq!(issue.state, IssueState::Closed);
        assert_eq!(issue.labels, vec!["bug", "auth"]);
        assert_eq!(issue.assignees, vec!["Ana", "bot"]);
        assert_eq!(issue.author_name(), "Bruno");
        assert_eq!(issue.milestone.as_ref().unwrap().title, "v1.2");
        assert_eq!(
            issue.updated_at.unwrap().to_rfc3339(),
            "2024-03-02T09:30:00+00:00"
        );
        assert_eq!(issue.due_date, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(issue.time_stats.unwrap().time_estimate, 3600);
        assert_eq!(issue.discussion_locked, None);
        assert_eq!(issue.weight, Some(3));
        assert_eq!(issue.user_notes_count, 5);
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn test_sparse_issue_gets_defaults() {
        let issue = issue(&json!({ "iid": 1, "title": "bare" }));
        assert_eq!(issue.id, 0);
        assert_eq!(issue.state, IssueState::Opened);
        assert!(issue.labels.is_empty());
        assert!(issue.assignees.is_empty());
        assert!(issue.author.is_none());
        assert!(issue.milestone.is_none());
        assert_eq!(issue.user_notes_count, 0);
        assert_eq!(issue.upvotes, 0);
        assert_eq!(issue.downvotes, 0);
        assert_eq!(issue.merge_requests_count, 0);
        assert_eq!(issue.author_name(), "unknown");
    }

    #[test]
    fn test_wrong_types_are_treated_as_absent() {
        let issue = issue(&json!({
            "iid": "seven",
            "labels": "bug",
            "author": "someone",
            "milestone": 3,
            "created_at": "yesterday",
            "upvotes": -4
        }));
        assert_eq!(issue.iid, 0);
        assert!(issue.labels.is_empty());
        assert!(issue.author.is_none());
        assert!(issue.milestone.is_none());
        assert!(issue.created_at.is_none());
        assert_eq!(issue.upvotes, 0);
    }

    #[test]
    fn test_upstream_iid_presence() {
        assert_eq!(upstream_iid(&json!({ "iid": 7 })), Some(7));
        assert_eq!(upstream_iid(&json!({ "id": 7 })), None);
        assert_eq!(upstream_iid(&json!({ "iid": "7" })), None);
    }

    #[test]
    fn test_label_detail_objects() {
        let issue = issue(&json!({ "labels": [{ "name": "bug", "color": "#f00" }, "ui"] }));
        assert_eq!(issue.labels, vec!["bug", "ui"]);
    }

    #[test]
    fn test_system_notes_are_dropped_in_order() {
        let raw = json!([
            { "id": 1, "body": "first", "system": false, "author": { "name": "A", "username": "a" } },
            { "id": 2, "body": "changed the description", "system": true },
            { "id": 3, "body": "third", "resolvable": true, "resolved": false }
        ]);
        let comments = comments(&raw);
        let ids: Vec<u64> = comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(comments[0].author_username(), "a");
        assert!(comments[1].resolvable);
        assert_eq!(comments[1].resolved, Some(false));
    }

    #[test]
    fn test_non_array_notes_payload_is_empty() {
        assert!(comments(&json!({ "message": "404 Not found" })).is_empty());
    }
}
