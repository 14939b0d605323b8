//! Optional pre-migration cleanup of the destination project.

use crate::destination::{pages, DestinationError, DestinationTracker, ExistingIssue};
use crate::summary::{CleanupFailure, CleanupReport};
use futures::TryStreamExt;
use tracing::{info, info_span, warn, Instrument};

/// Deletes every issue currently in the destination project.
///
/// The full listing is collected before the first deletion so removals can't
/// shift later pages. Failed deletions are logged and reported; they don't
/// stop the stage.
///
/// # Errors
///
/// Returns [`DestinationError`] only if the issue listing fails.
pub async fn clean_project<D: DestinationTracker>(
    destination: &D,
    project_id: u64,
) -> Result<CleanupReport, DestinationError> {
    let span = info_span!("cleanup", project_id);

    async {
        let existing: Vec<ExistingIssue> =
            pages(move |cursor| destination.list_issues(project_id, cursor))
                .try_concat()
                .await?;
        info!(count = existing.len(), "Deleting existing issues");

        let mut report = CleanupReport::default();
        for issue in existing {
            match destination.delete_issue(project_id, issue.iid).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!(iid = issue.iid, title = %issue.title, error = %e, "Failed to delete issue");
                    report.failures.push(CleanupFailure {
                        iid: issue.iid,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            deleted = report.deleted,
            failed = report.failures.len(),
            "Cleanup complete"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
