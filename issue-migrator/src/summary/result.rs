//! Per-issue and cleanup outcome types.

use std::fmt;

/// A step of an issue's migration that can fail without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubOperation {
    /// Looking up the destination id of the mapped assignee.
    ResolveAssignee,
    /// Creating the destination issue; later steps are skipped when this fails.
    Create,
    /// Creating the issue as its reporter; it was created as the token user instead.
    ImpersonateReporter { reporter: String },
    /// Closing the destination issue of a resolved source issue.
    Close,
    /// Posting the note linking back to the source issue.
    ProvenanceNote,
    /// Fetching comments and attachments from the source.
    FetchDetail,
    /// Replicating the comment at `index` in source order.
    Comment { index: usize },
    /// Downloading attachment bytes from the source.
    DownloadAttachment { filename: String },
    /// Uploading attachment bytes to the destination.
    UploadAttachment { filename: String },
    /// Posting the note that references an uploaded attachment.
    AttachmentNote { filename: String },
}

impl fmt::Display for SubOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResolveAssignee => write!(f, "resolve assignee"),
            Self::Create => write!(f, "create issue"),
            Self::ImpersonateReporter { reporter } => {
                write!(f, "create issue as reporter '{reporter}'")
            }
            Self::Close => write!(f, "close issue"),
            Self::ProvenanceNote => write!(f, "provenance note"),
            Self::FetchDetail => write!(f, "fetch comments and attachments"),
            Self::Comment { index } => write!(f, "comment #{}", index + 1),
            Self::DownloadAttachment { filename } => write!(f, "download attachment '{filename}'"),
            Self::UploadAttachment { filename } => write!(f, "upload attachment '{filename}'"),
            Self::AttachmentNote { filename } => write!(f, "attachment note '{filename}'"),
        }
    }
}

/// A failed sub-operation and its error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubOperationFailure {
    pub operation: SubOperation,
    pub error: String,
}

/// Result of migrating a single source issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOutcome {
    /// Source issue key, e.g. `PRO-7`.
    pub source_key: String,

    /// Project-local id of the created destination issue.
    pub destination_iid: Option<u64>,

    /// Every sub-operation that failed, in the order attempted.
    pub failures: Vec<SubOperationFailure>,
}

impl IssueOutcome {
    /// Creates an outcome with nothing recorded yet.
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            destination_iid: None,
            failures: Vec::new(),
        }
    }

    /// Records a failed sub-operation.
    pub fn record_failure(&mut self, operation: SubOperation, error: impl fmt::Display) {
        self.failures.push(SubOperationFailure {
            operation,
            error: error.to_string(),
        });
    }

    /// Returns true if the destination issue exists.
    #[must_use]
    pub fn created(&self) -> bool {
        self.destination_iid.is_some()
    }

    /// Returns true if the issue was created and every sub-operation succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.created() && self.failures.is_empty()
    }
}

/// A destination issue the cleanup stage couldn't delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub iid: u64,
    pub error: String,
}

/// Result of the cleanup stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Number of issues deleted.
    pub deleted: usize,

    /// Issues whose deletion failed.
    pub failures: Vec<CleanupFailure>,
}
