//! Config file deserialization.

use crate::config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Parsed contents of the migration config file, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Jira connection settings.
    pub source: SourceSection,

    /// GitLab connection settings.
    pub destination: DestinationSection,

    /// Migration behaviour switches.
    #[serde(default)]
    pub migration: MigrationSection,

    /// Jira user name as key, GitLab user name as value.
    #[serde(default)]
    pub identities: HashMap<String, String>,
}

/// The `[source]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceSection {
    /// Jira base URL, e.g. `https://jira.example.com/`.
    pub url: String,

    /// Basic-auth user name.
    pub username: String,

    /// Basic-auth password (may instead come from `JIRA_PASSWORD`).
    #[serde(default)]
    pub password: String,

    /// Jira project code used in the search filter.
    pub project: String,
}

/// The `[destination]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DestinationSection {
    /// GitLab base URL, e.g. `https://gitlab.example.com/`.
    pub url: String,

    /// Private access token (may instead come from `GITLAB_TOKEN`).
    #[serde(default)]
    pub token: String,

    /// Namespaced project path, e.g. `group/project`.
    pub project: Option<String>,

    /// Numeric project id; skips the project lookup when set.
    pub project_id: Option<u64>,
}

/// The `[migration]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MigrationSection {
    /// Delete every existing issue of the GitLab project first.
    #[serde(default)]
    pub cleanup: bool,

    /// Post a note linking each migrated issue back to Jira.
    #[serde(default = "default_provenance_note")]
    pub provenance_note: bool,

    /// Who comments and attachment notes are posted as.
    #[serde(default)]
    pub author_attribution: AuthorAttribution,

    /// Result cap of the single Jira search request.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Per-request timeout for both HTTP clients.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for MigrationSection {
    fn default() -> Self {
        Self {
            cleanup: false,
            provenance_note: default_provenance_note(),
            author_attribution: AuthorAttribution::default(),
            max_results: default_max_results(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// How authorship of replicated comments and attachments is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorAttribution {
    /// Everything is posted as the token owner.
    #[default]
    None,

    /// Requests are sent with a `Sudo` header naming the identity-mapped author.
    /// Requires an administrator token.
    Impersonate,
}

pub(crate) fn default_provenance_note() -> bool {
    true
}

pub(crate) fn default_max_results() -> u32 {
    10_000
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    300
}

impl ConfigFile {
    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable or not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&contents, path)
    }

    /// Parses config file contents; `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }
}
