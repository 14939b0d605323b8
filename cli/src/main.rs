//! CLI for the issue migrator.
//!
//! Copies every issue of a Jira project, with comments and attachments, into
//! a GitLab project.

use clap::Parser;
use issue_migrator::{load_config, Overrides, RunSummary, Runner, RunnerConfig, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Issue Migrator - Copy a Jira project's issues into a GitLab project.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the migration config file.
    #[arg(long, env = "ISSUE_MIGRATOR_CONFIG", default_value = "migrator.toml")]
    config: PathBuf,

    /// Jira password; takes precedence over JIRA_PASSWORD and the config file.
    #[arg(long)]
    jira_password: Option<String>,

    /// GitLab private token; takes precedence over GITLAB_TOKEN and the config file.
    #[arg(long)]
    gitlab_token: Option<String>,

    /// Delete every existing issue in the GitLab project before migrating.
    #[arg(long)]
    cleanup: bool,

    /// Preview the migration without writing to GitLab.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with compact output, filtered by `RUST_LOG` (default "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let overrides = Overrides {
        source_password: args.jira_password,
        destination_token: args.gitlab_token,
        cleanup: args.cleanup,
    };
    let migration = load_config(&args.config, &overrides)?;
    let runner = Runner::new(RunnerConfig::new(migration, args.dry_run))?;
    runner.run().await
}

/// Prints the final run summary and every failed sub-operation.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Issues found: {}", summary.issues_found);

    if summary.dry_run {
        return;
    }

    if let Some(cleanup) = &summary.cleanup {
        println!("  Issues deleted: {}", cleanup.deleted);
        println!("  Deletions failed: {}", cleanup.failures.len());
    }
    println!("  Issues created: {}", summary.issues_created);
    println!("  Issues failed: {}", summary.issues_failed);
    println!("  Sub-operations failed: {}", summary.sub_operations_failed);

    let mut failed = summary.failed_outcomes().peekable();
    if failed.peek().is_some() {
        println!("\nFailures:");
        for outcome in failed {
            match outcome.destination_iid {
                Some(iid) => println!("  {} -> #{iid}", outcome.source_key),
                None => println!("  {} (not created)", outcome.source_key),
            }
            for failure in &outcome.failures {
                println!("    {}: {}", failure.operation, failure.error);
            }
        }
    }

    if let Some(cleanup) = &summary.cleanup {
        for failure in &cleanup.failures {
            println!("  cleanup #{}: {}", failure.iid, failure.error);
        }
    }
}
