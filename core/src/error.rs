//! Error types for the moj.io client core.
//!
//! # Design
//! Every failure of a logical request is reported exactly once, as one of
//! these variants. `RequestFailed` is the generic "could not complete request"
//! outcome used when the server answered with a non-success status and a body
//! that is not a JSON object. `Server` keeps the decoded error object so
//! callers can read the platform's own `Message`/`ErrorCode` fields.

use serde_json::Value;
use thiserror::Error;

use crate::resource::Resource;

/// Errors produced while building, dispatching or handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A terminal operation ran before any endpoint URL was configured.
    #[error("no endpoint configured")]
    NoEndpoint,

    /// No response was received (connection, TLS, timeout...).
    #[error("could not complete request: {0}")]
    Transport(String),

    /// Non-success status with a structured error body.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: Value },

    /// Non-success status without a decodable body.
    #[error("could not complete request")]
    RequestFailed,

    /// A payload for `resource` did not match the model it maps to.
    #[error("failed to decode {resource} payload: {source}")]
    Decode {
        resource: Resource,
        #[source]
        source: serde_json::Error,
        payload: Value,
    },

    /// The request body could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Invalid client configuration (bad URL, runtime could not start...).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// True for the two "could not complete request" cases, which carry no
    /// server-provided detail.
    pub fn is_generic_failure(&self) -> bool {
        matches!(self, ApiError::RequestFailed | ApiError::Transport(_))
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
