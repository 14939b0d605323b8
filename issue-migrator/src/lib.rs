#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod cleanup;
pub mod config;
pub mod destination;
pub mod migrate;
pub mod project;
pub mod runner;
pub mod source;
pub mod summary;

pub use cleanup::clean_project;
pub use config::{
    load_config, AuthorAttribution, ConfigError, DestinationConfig, IdentityMap, MigrationConfig,
    MigrationOptions, Overrides, SourceConfig,
};
pub use destination::{
    DestinationError, DestinationTracker, GitLabClient, NewIssue, NewNote, Page, ProjectRef,
};
pub use migrate::{build_labels, map_issue, Migrator};
pub use project::resolve_project;
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use source::{JiraClient, SourceError, SourceIssue, SourceTracker};
pub use summary::{IssueOutcome, RunSummary, SubOperation, SubOperationFailure};
