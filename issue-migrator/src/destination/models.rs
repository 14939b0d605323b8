//! GitLab request and response payloads.

use serde::{Deserialize, Serialize};

/// A GitLab project as returned by lookup and listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    /// Numeric project id.
    pub id: u64,

    /// Namespaced path, e.g. `group/project`.
    #[serde(default)]
    pub path_with_namespace: String,
}

/// An existing issue of the destination project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExistingIssue {
    /// Project-local sequence number.
    pub iid: u64,

    #[serde(default)]
    pub title: String,
}

/// Payload of an issue creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Backdated creation time; honoured for administrators and project owners.
    pub created_at: String,

    /// Comma-separated label list.
    pub labels: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<u64>,

    /// User to create the issue as (`Sudo` header), not part of the body.
    #[serde(skip)]
    pub sudo: Option<String>,
}

/// The identifiers GitLab assigns to a created issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    /// Project-local sequence number; every follow-up call addresses the issue by it.
    pub iid: u64,

    #[serde(default)]
    pub web_url: Option<String>,
}

/// Payload of a note on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// User to post the note as (`Sudo` header), not part of the body.
    #[serde(skip)]
    pub sudo: Option<String>,
}

/// Body of the close transition sent to `PUT issues/:iid`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CloseIssue<'a> {
    pub state_event: &'static str,
    pub updated_at: &'a str,
}

/// Response of a project file upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    /// Markdown snippet referencing the uploaded file.
    pub markdown: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserRef {
    pub id: u64,
}
