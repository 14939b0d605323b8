//! Source tracker error types.

use thiserror::Error;

/// Errors raised while talking to Jira.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build Jira HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The server could not be reached at all.
    #[error("Couldn't connect to {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with an unexpected status.
    #[error("Jira request to {url} failed: {status}: {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    /// The issue search was rejected; carries the server-supplied messages.
    #[error("Jira search failed with status {status}: {}", .messages.join("; "))]
    Query { status: u16, messages: Vec<String> },

    /// The search matched more issues than it returned.
    #[error(
        "Jira search returned {fetched} of {total} issues; raise migration.max-results or the server's search limit"
    )]
    Truncated { fetched: usize, total: u64 },

    /// A request failed after the connection was established.
    #[error("Jira request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response body didn't have the expected shape.
    #[error("Unexpected Jira response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
