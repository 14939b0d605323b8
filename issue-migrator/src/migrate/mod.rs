//! Per-issue migration.
//!
//! For each source issue this module:
//! 1. Resolves the assignee through the identity map
//! 2. Creates the destination issue with mapped fields and labels
//! 3. Closes it if the source issue is resolved
//! 4. Posts a provenance note linking back to the source
//! 5. Replicates comments, then attachments, in source order
//!
//! Every step after creation is checked; failures are collected into the
//! issue's [`IssueOutcome`] and the remaining steps still run.

mod mapping;

pub use mapping::{build_labels, map_issue};

use crate::config::{AuthorAttribution, IdentityMap, MigrationOptions};
use crate::destination::{CreatedIssue, DestinationError, DestinationTracker, NewIssue, NewNote};
use crate::source::{Attachment, Comment, SourceIssue, SourceTracker};
use crate::summary::{IssueOutcome, SubOperation};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Migrates source issues into one destination project.
pub struct Migrator<'a, S, D> {
    source: &'a S,
    destination: &'a D,
    project_id: u64,
    identities: &'a IdentityMap,
    options: &'a MigrationOptions,
}

impl<'a, S, D> Migrator<'a, S, D>
where
    S: SourceTracker,
    D: DestinationTracker,
{
    pub fn new(
        source: &'a S,
        destination: &'a D,
        project_id: u64,
        identities: &'a IdentityMap,
        options: &'a MigrationOptions,
    ) -> Self {
        Self {
            source,
            destination,
            project_id,
            identities,
            options,
        }
    }

    /// Migrates issues one after another, in the given order.
    pub async fn migrate_all(&self, issues: &[SourceIssue]) -> Vec<IssueOutcome> {
        let mut outcomes = Vec::with_capacity(issues.len());
        for issue in issues {
            outcomes.push(self.migrate(issue).await);
        }
        outcomes
    }

    /// Migrates a single issue with its comments and attachments.
    pub async fn migrate(&self, issue: &SourceIssue) -> IssueOutcome {
        let span = info_span!("migrate_issue", key = %issue.key);

        async {
            let mut outcome = IssueOutcome::new(&issue.key);

            let assignee_ids = self.resolve_assignee(issue, &mut outcome).await;
            let new_issue = map_issue(issue, assignee_ids, self.sudo_for(issue.reporter.as_deref()));

            let created = match self.create_issue(new_issue, &mut outcome).await {
                Ok(created) => created,
                Err(e) => {
                    error!(error = %e, "Failed to create issue");
                    outcome.record_failure(SubOperation::Create, e);
                    return outcome;
                }
            };
            let iid = created.iid;
            outcome.destination_iid = Some(iid);
            debug!(iid, "Issue created");

            if let Some(resolved) = issue.resolved.as_deref() {
                if let Err(e) = self
                    .destination
                    .close_issue(self.project_id, iid, resolved)
                    .await
                {
                    warn!(iid, error = %e, "Failed to close issue");
                    outcome.record_failure(SubOperation::Close, e);
                }
            }

            if self.options.provenance_note {
                let note = NewNote {
                    body: self.source.browse_url(&issue.key),
                    created_at: None,
                    sudo: None,
                };
                if let Err(e) = self.destination.create_note(self.project_id, iid, &note).await {
                    warn!(iid, error = %e, "Failed to post provenance note");
                    outcome.record_failure(SubOperation::ProvenanceNote, e);
                }
            }

            match self.source.issue_detail(&issue.id).await {
                Ok(detail) => {
                    for (index, comment) in detail.comments.iter().enumerate() {
                        self.replicate_comment(iid, index, comment, &mut outcome)
                            .await;
                    }
                    for attachment in &detail.attachments {
                        self.replicate_attachment(iid, attachment, &mut outcome)
                            .await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch comments and attachments");
                    outcome.record_failure(SubOperation::FetchDetail, e);
                }
            }

            info!(
                iid,
                web_url = created.web_url.as_deref().unwrap_or_default(),
                failures = outcome.failures.len(),
                "Created issue #{iid}"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    /// Creates the destination issue. If creating it as the reporter fails,
    /// the issue is created once more as the token user and the lost
    /// attribution is recorded.
    async fn create_issue(
        &self,
        mut new_issue: NewIssue,
        outcome: &mut IssueOutcome,
    ) -> Result<CreatedIssue, DestinationError> {
        let e = match self.destination.create_issue(self.project_id, &new_issue).await {
            Ok(created) => return Ok(created),
            Err(e) => e,
        };
        let Some(reporter) = new_issue.sudo.take() else {
            return Err(e);
        };

        warn!(
            reporter = %reporter,
            error = %e,
            "Failed to create issue as reporter, retrying as token user"
        );
        let created = self
            .destination
            .create_issue(self.project_id, &new_issue)
            .await?;
        outcome.record_failure(SubOperation::ImpersonateReporter { reporter }, e);
        Ok(created)
    }

    /// Resolves the source assignee to a destination user id.
    ///
    /// Only assignees with an identity map entry are looked up; anyone else
    /// leaves the destination issue unassigned.
    async fn resolve_assignee(&self, issue: &SourceIssue, outcome: &mut IssueOutcome) -> Vec<u64> {
        let Some(assignee) = issue.assignee.as_deref() else {
            return Vec::new();
        };
        let Some(username) = self.identities.get(assignee) else {
            debug!(assignee, "Assignee has no identity mapping, leaving unassigned");
            return Vec::new();
        };

        match self.destination.find_user_id(username).await {
            Ok(Some(id)) => vec![id],
            Ok(None) => {
                warn!(username, "Mapped assignee not found in GitLab");
                Vec::new()
            }
            Err(e) => {
                warn!(username, error = %e, "Failed to look up assignee");
                outcome.record_failure(SubOperation::ResolveAssignee, e);
                Vec::new()
            }
        }
    }

    async fn replicate_comment(
        &self,
        iid: u64,
        index: usize,
        comment: &Comment,
        outcome: &mut IssueOutcome,
    ) {
        let note = NewNote {
            body: comment.body.clone(),
            created_at: Some(comment.created.clone()),
            sudo: self.sudo_for(comment.author.as_deref()),
        };

        if let Err(e) = self.destination.create_note(self.project_id, iid, &note).await {
            warn!(iid, index, error = %e, "Failed to replicate comment");
            outcome.record_failure(SubOperation::Comment { index }, e);
        }
    }

    /// Downloads an attachment, uploads it, then posts the returned reference
    /// as a note. The downloaded bytes are moved into the upload call and
    /// released when it returns.
    async fn replicate_attachment(
        &self,
        iid: u64,
        attachment: &Attachment,
        outcome: &mut IssueOutcome,
    ) {
        let filename = attachment.filename.clone();

        let content = match self
            .source
            .download_attachment(&attachment.content_url)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!(iid, filename = %filename, error = %e, "Failed to download attachment");
                outcome.record_failure(SubOperation::DownloadAttachment { filename }, e);
                return;
            }
        };

        let upload = match self
            .destination
            .upload_file(self.project_id, &attachment.filename, content)
            .await
        {
            Ok(upload) => upload,
            Err(e) => {
                warn!(iid, filename = %filename, error = %e, "Failed to upload attachment");
                outcome.record_failure(SubOperation::UploadAttachment { filename }, e);
                return;
            }
        };

        let note = NewNote {
            body: upload.markdown,
            created_at: Some(attachment.created.clone()),
            sudo: self.sudo_for(attachment.author.as_deref()),
        };
        if let Err(e) = self.destination.create_note(self.project_id, iid, &note).await {
            warn!(iid, filename = %filename, error = %e, "Failed to post attachment note");
            outcome.record_failure(SubOperation::AttachmentNote { filename }, e);
        }
    }

    /// The user to act as for content authored by `author`, if impersonation is on.
    fn sudo_for(&self, author: Option<&str>) -> Option<String> {
        match self.options.author_attribution {
            AuthorAttribution::None => None,
            AuthorAttribution::Impersonate => {
                author.map(|name| self.identities.resolve(name).to_string())
            }
        }
    }
}
