//! Runner configuration.

use crate::config::MigrationConfig;
use std::time::Duration;

/// Configuration for one migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Validated migration configuration.
    migration: MigrationConfig,
    /// Whether to preview the migration without writing to GitLab.
    dry_run: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(migration: MigrationConfig, dry_run: bool) -> Self {
        Self { migration, dry_run }
    }

    /// Returns the migration configuration.
    pub fn migration(&self) -> &MigrationConfig {
        &self.migration
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the per-request timeout for both trackers.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.migration.options.request_timeout_secs)
    }
}
