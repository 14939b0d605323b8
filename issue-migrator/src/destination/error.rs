//! Destination tracker error types.

use thiserror::Error;

/// Errors raised while talking to GitLab.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build GitLab HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The private token can't be sent as a header value.
    #[error("GitLab token is not a valid header value")]
    InvalidToken,

    /// The server could not be reached at all.
    #[error("Couldn't connect to {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with an unexpected status.
    #[error("GitLab request to {url} failed: {status}: {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    /// A request failed after the connection was established.
    #[error("GitLab request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response body didn't have the expected shape.
    #[error("Unexpected GitLab response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No project matches the configured path.
    #[error("GitLab project not found: {project}")]
    ProjectNotFound { project: String },
}
