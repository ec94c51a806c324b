//! recommit - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recommit::config::Config;
use recommit::event::TriggerContext;
use recommit::git::{GitCli, check_git_installed};
use recommit::github::GitHubDiffClient;
use recommit::llm::OpenAiClient;
use recommit::pipeline::{Ports, run};

/// Rewrite non-conventional commit messages on the pushed branch.
#[derive(Parser, Debug)]
#[command(name = "recommit")]
#[command(about = "Rewrite non-conventional commit messages with AI-generated ones")]
#[command(version)]
struct Cli {
    /// Generate and log messages without touching history
    #[arg(long)]
    dry_run: bool,

    /// Working tree of the pushed repository
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Show git commands and other debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Check prerequisites
    check_git_installed().context("git is required")?;

    let mut config = Config::from_env().context("Invalid action inputs")?;
    config.dry_run = cli.dry_run;

    // Step 2: Read the trigger
    let ctx = TriggerContext::from_env().context("Failed to read the trigger event")?;

    // Step 3: Build clients
    let diffs = GitHubDiffClient::new(&config.github_token, &config.github_api_url, config.timeout)
        .context("Failed to create GitHub client")?;
    let completion = OpenAiClient::new(
        &config.openai_api_endpoint,
        &config.openai_api_key,
        config.timeout,
    )
    .context("Failed to create completion client")?;

    let ports = Ports {
        vcs: Arc::new(GitCli::new(&cli.repo_dir, config.timeout)),
        diffs: Arc::new(diffs),
        completion: Arc::new(completion),
    };

    // Step 4: Run
    let report = run(&config, &ctx, &ports).await?;

    if report.is_empty() {
        info!("Nothing to rewrite");
    }

    Ok(())
}

/// Log to stderr, honouring `RUST_LOG` when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "recommit=debug" } else { "recommit=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
