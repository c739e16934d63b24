//! Listing-Scout main entry point
//!
//! This is the command-line interface for the Listing-Scout harvester.

use anyhow::Context;
use clap::Parser;
use listing_scout::config::{load_config_with_hash, Config};
use listing_scout::crawler::harvest;
use listing_scout::output::print_statistics;
use listing_scout::ScoutError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing-Scout: a marketplace listing harvester
///
/// Listing-Scout reads the listing links of one eBay search-results page,
/// fetches every listing with a bounded number of pages open at a time and
/// writes name, seller, image, price and shipping cost of each to JSON.
#[derive(Parser, Debug)]
#[command(name = "listing-scout")]
#[command(version = "1.0.0")]
#[command(about = "A marketplace listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Write the JSON records here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(output) = cli.output {
        config.output.json_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_scout=info,warn"),
            1 => EnvFilter::new("listing_scout=debug,info"),
            2 => EnvFilter::new("listing_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Listing-Scout Dry Run ===\n");

    println!("Harvest Configuration:");
    println!(
        "  Max concurrent pages: {}",
        config.harvest.max_concurrent_pages_open
    );
    println!("  Request timeout: {}s", config.harvest.request_timeout_secs);
    println!("  Connect timeout: {}s", config.harvest.connect_timeout_secs);
    println!("  Fail on error: {}", config.harvest.fail_on_error);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nSearch:");
    println!("  URL: {}", config.search.url);
    println!("  Blocked page title: {}", config.search.blocked_title);

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);

    println!("\n✓ Configuration is valid");
    println!("✓ Would discover listings on {}", config.search.url);
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Starting harvest of {}", config.search.url);

    let report = match harvest(config).await {
        Ok(report) => report,
        Err(ScoutError::Blocked { url }) => {
            tracing::error!(
                "The marketplace refused {} (page title matched {:?}); retry later",
                url,
                config.search.blocked_title
            );
            anyhow::bail!("harvest blocked by the marketplace");
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e).context("Harvest failed");
        }
    };

    if !report.outcome.failures.is_empty() {
        println!("Failed listings:");
        for failure in &report.outcome.failures {
            println!("  {} ({})", failure.url, failure.kind);
        }
        println!();
    }

    print_statistics(&report.statistics);
    println!("\n✓ Records written to: {}", config.output.json_path);

    Ok(())
}
