//! Canonical issue shape shared by every stage of a run.
//!
//! Values here are produced by `normalize`, never mutated afterwards, and
//! written out by `export`. Field order is the JSON artifact's field order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One upstream tracked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: IssueState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub assignees: Vec<String>,
    pub author: Option<Author>,
    pub web_url: String,
    pub references: Option<serde_json::Value>,
    pub time_stats: Option<TimeStats>,
    pub confidential: bool,
    pub discussion_locked: Option<bool>,
    pub due_date: Option<NaiveDate>,
    pub has_tasks: bool,
    pub task_status: Option<String>,
    pub weight: Option<i64>,
    pub user_notes_count: u64,
    pub merge_requests_count: u64,
    pub upvotes: u64,
    pub downvotes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Issue {
    /// Same issue carrying its discussion thread.
    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        Self { comments, ..self }
    }

    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(Author::display_name).unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn author_username(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or(UNKNOWN_AUTHOR)
    }
}

/// One discussion note on an issue. System notes never become a Comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub author: Option<Author>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub resolvable: bool,
    pub resolved: Option<bool>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(Author::display_name).unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn author_username(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or(UNKNOWN_AUTHOR)
    }
}

/// Placeholder shown when upstream omits the author object.
pub const UNKNOWN_AUTHOR: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub username: String,
}

impl Author {
    /// Name, falling back to username when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Option<u64>,
    pub iid: Option<u64>,
    pub title: String,
    pub state: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStats {
    pub time_estimate: u64,
    pub total_time_spent: u64,
    pub human_time_estimate: Option<String>,
    pub human_total_time_spent: Option<String>,
}

/// Issue state as reported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Opened,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Opened => "opened",
            IssueState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
