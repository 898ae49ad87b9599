// src/error.rs
// =============================================================================
// Error types returned by the library.
//
// Every failure falls into one of two buckets:
// - Remote: the HTTP request itself went wrong (bad status, timeout,
//   connection refused, ...)
// - Decode: we got a body back but it isn't the JSON shape we expect
//
// Nothing in the library retries or swallows these. They surface at the
// exact call that triggered the request.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while talking to the Gist API.
#[derive(Debug, Error)]
pub enum GistError {
    /// Transport or HTTP-level failure.
    #[error("request to {url} failed: {reason}")]
    Remote { url: String, reason: RemoteReason },

    /// The response body was not the JSON we expected.
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: DecodeReason },

    /// Bad input given to the library before any request was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Why a request failed.
#[derive(Debug, Error)]
pub enum RemoteReason {
    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),

    #[error("request timed out")]
    Timeout,

    #[error(transparent)]
    Transport(reqwest::Error),
}

/// Why a response body was rejected.
#[derive(Debug, Error)]
pub enum DecodeReason {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("response has no entries in its `gists` array")]
    EmptyEnvelope,

    #[error("asked for gist `{requested}` but the API answered with `{returned}`")]
    RepoMismatch { requested: String, returned: String },
}

impl GistError {
    /// True for transport and HTTP status failures.
    pub fn is_remote(&self) -> bool {
        matches!(self, GistError::Remote { .. })
    }

    /// True when the body could not be turned into gist metadata.
    pub fn is_decode(&self) -> bool {
        matches!(self, GistError::Decode { .. })
    }

    /// The HTTP status, if the server answered with a non-success code.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GistError::Remote {
                reason: RemoteReason::Status(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn remote(url: &str, reason: RemoteReason) -> Self {
        GistError::Remote {
            url: url.to_string(),
            reason,
        }
    }

    pub(crate) fn decode(url: &str, reason: impl Into<DecodeReason>) -> Self {
        GistError::Decode {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    // Sorts a reqwest error into the buckets above, the same way link
    // checking tells timeouts apart from other connection problems.
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GistError::remote(url, RemoteReason::Timeout)
        } else if let Some(status) = error.status() {
            GistError::remote(url, RemoteReason::Status(status))
        } else {
            GistError::remote(url, RemoteReason::Transport(error))
        }
    }
}
