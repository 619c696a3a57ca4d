//! Errors from model invocations.

use thiserror::Error;

/// Error returned by `LlmClient::invoke`.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Provider returned an error (5xx or unexpected body).
    #[error("api error: {0}")]
    Api(String),

    /// Rate limited (429).
    #[error("rate limit: {0}")]
    RateLimit(String),

    /// Authentication failed (401/403).
    #[error("auth failed: {0}")]
    Auth(String),

    /// Request rejected (other 4xx).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be parsed.
    #[error("parsing failed: {0}")]
    Parsing(String),

    /// A scripted client ran out of responses.
    #[error("no scripted response left")]
    Exhausted,
}
