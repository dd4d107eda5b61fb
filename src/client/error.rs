//! Error type for the API client

use thiserror::Error;

/// A single GET that did not yield a JSON body.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("failed to build HTTP client")]
    Setup(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl NetworkError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, when the server answered with a failure status.
    pub fn body(&self) -> Option<&str> {
        match self {
            NetworkError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
