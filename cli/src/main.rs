//! CLI for the Phabricator to GitLab issue migrator.
//!
//! This tool copies Maniphest tasks, their comments and embedded files into
//! GitLab issues and leaves a forwarding comment on every migrated task.

use clap::Parser;
use phab_gitlab_migrator::{
    load_config, ConfigFile, MigrationStatus, RunSummary, Runner, RunnerError, WritebackStatus,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Phabricator to GitLab issue migrator - Move Maniphest tasks into a GitLab project.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Phabricator Conduit API URL (e.g. https://phab.example.com/api/).
    #[arg(long, env = "PHABRICATOR_URL")]
    url: Option<String>,

    /// Phabricator Conduit API token.
    #[arg(long, env = "PHABRICATOR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab project API URL (e.g. https://gitlab.example.com/api/v4/projects/42).
    #[arg(long, env = "GITLAB_URL")]
    gitlab_url: Option<String>,

    /// GitLab private token.
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,

    /// Maniphest status to migrate [default: open].
    #[arg(long)]
    status: Option<String>,

    /// Directory receiving per-issue dumps [default: .].
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory downloaded files are staged in [default: .].
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Compose issues without uploading, creating or commenting.
    #[arg(long)]
    dry_run: bool,

    /// Record issues that can't be fetched as failed instead of stopping.
    #[arg(long)]
    keep_going: bool,
}

impl Args {
    /// Converts the flags into config overrides; unset flags keep file values.
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            source_url: self.url.clone(),
            source_token: self.token.clone(),
            destination_url: self.gitlab_url.clone(),
            destination_token: self.gitlab_token.clone(),
            status: self.status.clone(),
            output_dir: self.output_dir.clone(),
            staging_dir: self.staging_dir.clone(),
            request_timeout_secs: self.timeout_secs,
            dry_run: self.dry_run.then_some(true),
            keep_going: self.keep_going.then_some(true),
        }
    }
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

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let config = load_config(args.config.as_deref(), args.overrides())?;
    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Issues found: {}", summary.issues_found);

    if summary.dry_run {
        println!("  Issues previewed: {}", summary.issues_previewed);
    } else {
        println!("  Issues created: {}", summary.issues_created);
        println!("  Issues skipped: {}", summary.issues_skipped);
        println!("  Forwarding comments failed: {}", summary.writebacks_failed);
    }
    println!("  Issues failed: {}", summary.issues_failed);

    for report in &summary.reports {
        match &report.status {
            MigrationStatus::Created { url, writeback } => {
                let note = match writeback {
                    WritebackStatus::Posted => String::new(),
                    WritebackStatus::Failed { error } => {
                        format!(" (forwarding comment failed: {error})")
                    }
                };
                println!("  {} -> {url}{note}", report.monogram);
            }
            MigrationStatus::Skipped { url, .. } => {
                println!("  {} already at {url}", report.monogram);
            }
            MigrationStatus::DryRun => {}
            MigrationStatus::Failed { stage, error } => {
                println!("  {} failed during {stage}: {error}", report.monogram);
            }
        }
    }
}
