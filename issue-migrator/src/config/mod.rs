//! Configuration loading and validation.
//!
//! The configuration is read once at startup from a TOML file, merged with
//! secrets from the command line or environment, validated, and then passed
//! by reference into every pipeline stage.

mod error;
mod identity;
mod settings;

pub use error::ConfigError;
pub use identity::IdentityMap;
pub use settings::{
    AuthorAttribution, ConfigFile, DestinationSection, MigrationSection, SourceSection,
};

use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Environment variable holding the Jira password.
pub const SOURCE_PASSWORD_ENV: &str = "JIRA_PASSWORD";

/// Environment variable holding the GitLab private token.
pub const DESTINATION_TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Jira connection settings.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL, always ending with `/`.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Project code used in the search filter.
    pub project: String,
}

/// GitLab connection settings.
#[derive(Debug, Clone)]
pub struct DestinationConfig {
    /// Base URL, always ending with `/`.
    pub url: String,
    pub token: String,
    /// Namespaced project path.
    pub project: Option<String>,
    /// Numeric project id.
    pub project_id: Option<u64>,
}

/// Behaviour switches of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub cleanup: bool,
    pub provenance_note: bool,
    pub author_attribution: AuthorAttribution,
    pub max_results: u32,
    pub request_timeout_secs: u64,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        MigrationSection::default().into()
    }
}

impl From<MigrationSection> for MigrationOptions {
    fn from(section: MigrationSection) -> Self {
        Self {
            cleanup: section.cleanup,
            provenance_note: section.provenance_note,
            author_attribution: section.author_attribution,
            max_results: section.max_results,
            request_timeout_secs: section.request_timeout_secs,
        }
    }
}

/// Validated configuration of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    pub options: MigrationOptions,
    pub identities: IdentityMap,
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Jira password.
    pub source_password: Option<String>,
    /// GitLab private token.
    pub destination_token: Option<String>,
    /// Forces the cleanup stage on.
    pub cleanup: bool,
}

/// Loads, merges and validates the migration configuration.
///
/// Secrets are resolved in order: `overrides`, then the `JIRA_PASSWORD` /
/// `GITLAB_TOKEN` environment variables, then the file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file can't be read or parsed, or if a
/// required field is missing or invalid.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<MigrationConfig, ConfigError> {
    info!(path = %path.display(), "Loading configuration");
    let file = ConfigFile::load(path)?;
    let config = MigrationConfig::from_file(file, overrides, path)?;
    debug!(
        identities = config.identities.len(),
        cleanup = config.options.cleanup,
        "Configuration loaded"
    );
    Ok(config)
}

impl MigrationConfig {
    /// Builds a validated configuration from a parsed file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending field.
    pub fn from_file(
        file: ConfigFile,
        overrides: &Overrides,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        let source_password = resolve_secret(
            overrides.source_password.as_deref(),
            SOURCE_PASSWORD_ENV,
            &file.source.password,
        );
        let destination_token = resolve_secret(
            overrides.destination_token.as_deref(),
            DESTINATION_TOKEN_ENV,
            &file.destination.token,
        );

        let source = SourceConfig {
            url: normalize_base_url(&file.source.url).map_err(|e| {
                invalid(format!("source.url '{}' is invalid: {e}", file.source.url))
            })?,
            username: require("source.username", &file.source.username).map_err(invalid)?,
            password: require("source.password", &source_password).map_err(invalid)?,
            project: require("source.project", &file.source.project).map_err(invalid)?,
        };

        let project = file
            .destination
            .project
            .map(|p| p.trim().trim_matches('/').to_string())
            .filter(|p| !p.is_empty());
        if project.is_none() && file.destination.project_id.is_none() {
            return Err(invalid(
                "destination.project or destination.project-id must be set".to_string(),
            ));
        }

        let destination = DestinationConfig {
            url: normalize_base_url(&file.destination.url).map_err(|e| {
                invalid(format!(
                    "destination.url '{}' is invalid: {e}",
                    file.destination.url
                ))
            })?,
            token: require("destination.token", &destination_token).map_err(invalid)?,
            project,
            project_id: file.destination.project_id,
        };

        let mut options = MigrationOptions::from(file.migration);
        options.cleanup |= overrides.cleanup;
        if options.max_results == 0 {
            return Err(invalid(
                "migration.max-results must be greater than zero".to_string(),
            ));
        }
        if options.request_timeout_secs == 0 {
            return Err(invalid(
                "migration.request-timeout-secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            source,
            destination,
            options,
            identities: IdentityMap::from(file.identities),
        })
    }
}

/// Picks the first non-empty secret from the override, the environment, the file.
fn resolve_secret(override_value: Option<&str>, env_var: &str, file_value: &str) -> String {
    override_value
        .map(str::to_owned)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| file_value.to_owned())
}

fn require(field: &str, value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(value.to_string())
}

/// Parses a base URL and makes sure its path ends with `/`, so endpoint paths
/// can be appended directly.
fn normalize_base_url(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.to_string())
}
