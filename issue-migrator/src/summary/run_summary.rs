//! Run summary types.

use super::result::{CleanupReport, IssueOutcome};

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of issues the source search returned.
    pub issues_found: usize,

    /// Number of destination issues created.
    pub issues_created: usize,

    /// Number of source issues whose destination issue couldn't be created.
    pub issues_failed: usize,

    /// Number of failed sub-operations across all created issues.
    pub sub_operations_failed: usize,

    /// Cleanup stage result, if the stage ran.
    pub cleanup: Option<CleanupReport>,

    /// Per-issue outcomes in migration order.
    pub outcomes: Vec<IssueOutcome>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with an issue outcome.
    pub fn record_outcome(&mut self, outcome: IssueOutcome) {
        if outcome.created() {
            self.issues_created += 1;
            self.sub_operations_failed += outcome.failures.len();
        } else {
            self.issues_failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Stores the cleanup stage result.
    pub fn record_cleanup(&mut self, report: CleanupReport) {
        self.cleanup = Some(report);
    }

    /// Outcomes with at least one failure.
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &IssueOutcome> {
        self.outcomes.iter().filter(|o| !o.is_complete())
    }

    /// Number of issues the cleanup stage failed to delete.
    #[must_use]
    pub fn cleanup_failures(&self) -> usize {
        self.cleanup.as_ref().map_or(0, |report| report.failures.len())
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.issues_failed > 0 || self.sub_operations_failed > 0 || self.cleanup_failures() > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
