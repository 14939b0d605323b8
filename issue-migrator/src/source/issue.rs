//! Jira issue data and its REST v2 wire format.

use serde::Deserialize;

/// An issue fetched from Jira. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIssue {
    /// Numeric Jira id, used for the detail endpoint.
    pub id: String,

    /// Project-scoped key, e.g. `PRO-7`.
    pub key: String,

    pub summary: String,

    pub description: Option<String>,

    /// Creation timestamp as returned by Jira.
    pub created: String,

    /// Resolution timestamp; `None` while the issue is unresolved.
    pub resolved: Option<String>,

    pub reporter: Option<String>,

    pub assignee: Option<String>,

    /// Status name, e.g. `Open`.
    pub status: String,

    /// Issue type name, e.g. `Bug`.
    pub issue_type: String,

    /// Names of the fix versions.
    pub fix_versions: Vec<String>,
}

/// Comments and attachments of one issue, in Jira order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueDetail {
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

/// A Jira comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: Option<String>,
    pub body: String,
    pub created: String,
}

/// A Jira attachment; its bytes are fetched on demand from `content_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub author: Option<String>,
    pub filename: String,
    pub created: String,
    pub content_url: String,
}

/// Body of `GET rest/api/2/search`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    /// Number of issues matching the query, regardless of the result cap.
    pub total: Option<u64>,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

/// Error body Jira returns alongside a non-200 status.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JiraIssue {
    pub id: String,
    pub key: String,
    pub fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
    pub description: Option<String>,
    pub created: String,
    #[serde(rename = "resolutiondate")]
    pub resolution_date: Option<String>,
    pub reporter: Option<JiraUser>,
    pub assignee: Option<JiraUser>,
    pub status: Option<Named>,
    #[serde(rename = "issuetype")]
    pub issue_type: Option<Named>,
    #[serde(rename = "fixVersions", default)]
    pub fix_versions: Vec<Named>,
}

/// Jira Server identifies users by `name`; Cloud only exposes `displayName`.
#[derive(Debug, Deserialize)]
pub(crate) struct JiraUser {
    pub name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

impl JiraUser {
    fn identity(self) -> Option<String> {
        self.name.or(self.display_name)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Named {
    pub name: String,
}

/// Body of `GET rest/api/2/issue/{id}?fields=attachment,comment`.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailResponse {
    pub fields: DetailFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailFields {
    pub comment: Option<CommentPage>,
    #[serde(default)]
    pub attachment: Vec<JiraAttachment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentPage {
    #[serde(default)]
    pub comments: Vec<JiraComment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JiraComment {
    pub author: Option<JiraUser>,
    #[serde(default)]
    pub body: String,
    pub created: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JiraAttachment {
    pub author: Option<JiraUser>,
    pub filename: String,
    pub created: String,
    pub content: String,
}

impl From<JiraIssue> for SourceIssue {
    fn from(issue: JiraIssue) -> Self {
        let fields = issue.fields;
        Self {
            id: issue.id,
            key: issue.key,
            summary: fields.summary,
            description: fields.description,
            created: fields.created,
            resolved: fields.resolution_date,
            reporter: fields.reporter.and_then(JiraUser::identity),
            assignee: fields.assignee.and_then(JiraUser::identity),
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            issue_type: fields.issue_type.map(|t| t.name).unwrap_or_default(),
            fix_versions: fields.fix_versions.into_iter().map(|v| v.name).collect(),
        }
    }
}

impl From<DetailResponse> for IssueDetail {
    fn from(detail: DetailResponse) -> Self {
        let fields = detail.fields;
        Self {
            comments: fields
                .comment
                .map(|page| page.comments)
                .unwrap_or_default()
                .into_iter()
                .map(|c| Comment {
                    author: c.author.and_then(JiraUser::identity),
                    body: c.body,
                    created: c.created,
                })
                .collect(),
            attachments: fields
                .attachment
                .into_iter()
                .map(|a| Attachment {
                    author: a.author.and_then(JiraUser::identity),
                    filename: a.filename,
                    created: a.created,
                    content_url: a.content,
                })
                .collect(),
        }
    }
}
