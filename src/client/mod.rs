//! GitLab REST access.
//!
//! "Do X": Issue one GET, hand back parsed JSON.
//!
//! The `RequestClient` trait is the seam the rest of the crate talks to.
//! `GitLabClient` is the blocking reqwest implementation; tests substitute
//! scripted clients. No retry happens here - retry policy belongs to callers.
//!
//! # Example
//!
//! ```ignore
//! use glean::client::{self, GitLabClient, RequestClient};
//!
//! let api = GitLabClient::new("https://gitlab.com")?;
//! let page = api.get_json(&client::issues_path("group/project"), &[("page", "1".into())])?;
//! ```

mod error;
mod internal;

pub use error::NetworkError;
pub use internal::GitLabClient;

use serde_json::Value;

/// User-Agent sent on every request.
pub const IDENTITY: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                            (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Public instance used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

/// One synchronous GET returning a decoded JSON body.
pub trait RequestClient {
    /// `path` is relative to the API root (`{base}/api/v4`).
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, NetworkError>;
}

/// `projects/{encoded path}/issues`
pub fn issues_path(project: &str) -> String {
    format!("projects/{}/issues", urlencoding::encode(project))
}

/// `projects/{encoded path}/issues/{iid}/notes`
pub fn notes_path(project: &str, iid: u64) -> String {
    format!("{}/{}/notes", issues_path(project), iid)
}

/// `{base}/api/v4`, tolerating trailing slashes on the base.
pub fn api_root(base_url: &str) -> String {
    format!("{}/api/v4", base_url.trim_end_matches('/'))
}
