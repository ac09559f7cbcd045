//! Error types surfaced by the mock backend.

use crate::http::{HttpErrorResponse, HttpMethod};
use thiserror::Error;

/// Failures an intercepted request can resolve to.
#[derive(Debug, Clone, Error)]
pub enum MockApiError {
    /// The handler has already replied `limit` times.
    #[error("execution limit of {limit} reached for handler `{url}`")]
    ReplyLimitExceeded { url: String, limit: u32 },

    /// The handler was registered but never given a reply callback.
    #[error("reply callback is not configured for handler `{url}`")]
    NoReplyConfigured { url: String },

    /// The handler was invoked without a request attached.
    #[error("request context is missing for handler `{url}`")]
    NoRequestContext { url: String },

    /// A synthesized error envelope (404 for an empty reply, or the
    /// status the reply callback declared).
    #[error("{0}")]
    Http(HttpErrorResponse),

    /// The request was not mocked and there is no transport behind the pipeline.
    #[error("no transport available for {method} {url}")]
    Unreachable { method: HttpMethod, url: String },

    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),
}

impl MockApiError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            MockApiError::Http(response) => Some(response.status),
            _ => None,
        }
    }
}

impl From<HttpErrorResponse> for MockApiError {
    fn from(response: HttpErrorResponse) -> Self {
        MockApiError::Http(response)
    }
}
