//! Runner error types.

/// Fatal errors that abort a run before or between pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Jira connectivity, authentication or query errors.
    #[error(transparent)]
    Source(#[from] crate::source::SourceError),

    /// GitLab connectivity, authentication or project resolution errors.
    #[error(transparent)]
    Destination(#[from] crate::destination::DestinationError),
}
