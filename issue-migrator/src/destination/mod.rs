//! Writing issues into the destination tracker (GitLab).
//!
//! [`DestinationTracker`] is the seam the pipeline talks to; [`GitLabClient`]
//! is the REST v4 implementation.

mod error;
mod gitlab;
mod models;
mod pagination;

pub use error::DestinationError;
pub use gitlab::GitLabClient;
pub use models::{CreatedIssue, ExistingIssue, NewIssue, NewNote, ProjectRef, UploadResult};
pub use pagination::{next_link, pages, Page};

use async_trait::async_trait;

/// Access to the tracker issues are migrated into.
///
/// Listing methods take a cursor: `None` for the first page, otherwise the
/// `next` value of the previous [`Page`].
#[async_trait]
pub trait DestinationTracker: Send + Sync {
    /// Issues an authenticated read against the projects endpoint.
    ///
    /// # Errors
    ///
    /// [`DestinationError::Unreachable`] on transport failure,
    /// [`DestinationError::Status`] on any answer other than 200.
    async fn probe(&self) -> Result<(), DestinationError>;

    /// Looks a project up by its namespaced path; `None` when it doesn't exist.
    async fn find_project(&self, path: &str) -> Result<Option<ProjectRef>, DestinationError>;

    /// Lists projects matching a search term.
    async fn list_projects(
        &self,
        search: &str,
        cursor: Option<String>,
    ) -> Result<Page<ProjectRef>, DestinationError>;

    /// Lists the issues of a project.
    async fn list_issues(
        &self,
        project_id: u64,
        cursor: Option<String>,
    ) -> Result<Page<ExistingIssue>, DestinationError>;

    /// Deletes an issue; anything but 204 is an error.
    async fn delete_issue(&self, project_id: u64, iid: u64) -> Result<(), DestinationError>;

    async fn create_issue(
        &self,
        project_id: u64,
        issue: &NewIssue,
    ) -> Result<CreatedIssue, DestinationError>;

    /// Closes an issue, recording `closed_at` as the time of the transition.
    async fn close_issue(
        &self,
        project_id: u64,
        iid: u64,
        closed_at: &str,
    ) -> Result<(), DestinationError>;

    async fn create_note(
        &self,
        project_id: u64,
        iid: u64,
        note: &NewNote,
    ) -> Result<(), DestinationError>;

    /// Uploads a file to the project; the result references it in markdown.
    async fn upload_file(
        &self,
        project_id: u64,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<UploadResult, DestinationError>;

    /// Resolves a username to a user id; only the first match is used.
    async fn find_user_id(&self, username: &str) -> Result<Option<u64>, DestinationError>;
}
