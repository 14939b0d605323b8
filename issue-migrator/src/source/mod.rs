//! Reading issues out of the source tracker (Jira).
//!
//! [`SourceTracker`] is the seam the pipeline talks to; [`JiraClient`] is the
//! REST v2 implementation.

mod error;
mod issue;
mod jira;

pub use error::SourceError;
pub use issue::{Attachment, Comment, IssueDetail, SourceIssue};
pub use jira::JiraClient;

use async_trait::async_trait;

/// Read-only access to the tracker issues are migrated from.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    /// Issues an authenticated read against the base endpoint.
    ///
    /// # Errors
    ///
    /// [`SourceError::Unreachable`] on transport failure, [`SourceError::Status`]
    /// on any answer other than 200.
    async fn probe(&self) -> Result<(), SourceError>;

    /// Fetches every issue of `project` in one request capped at `max_results`.
    ///
    /// All-or-nothing: a rejected query yields [`SourceError::Query`].
    async fn search_issues(
        &self,
        project: &str,
        max_results: u32,
    ) -> Result<Vec<SourceIssue>, SourceError>;

    /// Fetches the comments and attachments of one issue.
    async fn issue_detail(&self, issue_id: &str) -> Result<IssueDetail, SourceError>;

    /// Downloads the raw bytes behind an attachment's content URL.
    async fn download_attachment(&self, content_url: &str) -> Result<Vec<u8>, SourceError>;

    /// Canonical browse URL of an issue key.
    fn browse_url(&self, key: &str) -> String;
}
