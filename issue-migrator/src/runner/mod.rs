//! Orchestrates a full Jira to GitLab migration.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::cleanup::clean_project;
use crate::destination::{DestinationTracker, GitLabClient};
use crate::migrate::{build_labels, Migrator};
use crate::project::resolve_project;
use crate::source::{JiraClient, SourceIssue, SourceTracker};
use crate::summary::RunSummary;
use tracing::{info, warn};

/// Runs the migration pipeline once: probe both systems, fetch the source
/// issues, resolve the destination project, optionally clean it, then migrate
/// every issue in source order.
pub struct Runner<S = JiraClient, D = GitLabClient> {
    config: RunnerConfig,
    source: S,
    destination: D,
}

impl Runner {
    /// Builds a runner talking to the configured Jira and GitLab servers.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let timeout = config.request_timeout();
        let source = JiraClient::new(&config.migration().source, timeout)?;
        let destination = GitLabClient::new(&config.migration().destination, timeout)?;
        Ok(Self::with_trackers(config, source, destination))
    }
}

impl<S, D> Runner<S, D>
where
    S: SourceTracker,
    D: DestinationTracker,
{
    /// Builds a runner around existing tracker implementations.
    pub fn with_trackers(config: RunnerConfig, source: S, destination: D) -> Self {
        Self {
            config,
            source,
            destination,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Executes the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] for fatal conditions: an unreachable system, a
    /// rejected probe or search, a failed cleanup listing, or an unresolvable
    /// project. All of these happen before the first issue is created.
    /// Per-issue failures are reported in the returned [`RunSummary`].
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let migration = self.config.migration();
        let mut summary = RunSummary::new(self.config.dry_run());

        info!(url = %migration.source.url, "Testing Jira connection");
        self.source.probe().await?;
        info!("Jira connection was successful");

        info!(url = %migration.destination.url, "Testing GitLab connection");
        self.destination.probe().await?;
        info!("GitLab connection was successful");

        info!(project = %migration.source.project, "Fetching Jira issues");
        let issues = self
            .source
            .search_issues(&migration.source.project, migration.options.max_results)
            .await?;
        info!(
            count = issues.len(),
            project = %migration.source.project,
            "Found issues"
        );
        summary.issues_found = issues.len();

        let project = resolve_project(&self.destination, &migration.destination).await?;

        if self.config.dry_run() {
            print_dry_run_preview(&issues, &project.path_with_namespace, project.id);
            return Ok(summary);
        }

        if migration.options.cleanup {
            let report = clean_project(&self.destination, project.id).await?;
            summary.record_cleanup(report);
        }

        if issues.is_empty() {
            warn!("No issues to migrate");
            return Ok(summary);
        }

        let migrator = Migrator::new(
            &self.source,
            &self.destination,
            project.id,
            &migration.identities,
            &migration.options,
        );
        for outcome in migrator.migrate_all(&issues).await {
            summary.record_outcome(outcome);
        }

        info!(
            created = summary.issues_created,
            project = %migration.source.project,
            "Imported issues"
        );
        Ok(summary)
    }
}

fn print_dry_run_preview(issues: &[SourceIssue], project_path: &str, project_id: u64) {
    println!("\n[DRY RUN] Target project: {project_path} ({project_id})");
    println!("  Would migrate {} issues:\n", issues.len());

    for (i, issue) in issues.iter().enumerate() {
        println!("  [{}/{}] {} {}", i + 1, issues.len(), issue.key, issue.summary);
        println!("    Labels: {}", build_labels(issue));
        if let Some(resolved) = &issue.resolved {
            println!("    Would close at: {resolved}");
        }
    }

    println!();
}
