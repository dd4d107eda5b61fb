//! Internal implementation for the API client.
//!
//! Contains the reqwest blocking calls and response handling.
//! Not exposed in public interface.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;

use super::{api_root, NetworkError, RequestClient, IDENTITY};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking GitLab REST client.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    api_root: String,
    http: Client,
}

impl GitLabClient {
    /// Client for `{base_url}/api/v4`.
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(IDENTITY)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NetworkError::Setup)?;

        Ok(Self {
            api_root: api_root(base_url),
            http,
        })
    }
}

impl RequestClient for GitLabClient {
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, NetworkError> {
        let url = format!("{}/{}", self.api_root, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .map_err(|source| NetworkError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable body is left empty.
            let body = response.text().unwrap_or_default();
            return Err(NetworkError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().map_err(|source| NetworkError::Transport {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| NetworkError::Decode { url, source })
    }
}
