//! Dawr - S3 Lifecycle Policy Reconciliation
//!
//! Converges live bucket lifecycle configuration onto the policies
//! declared in TOML documents stored under an S3 prefix.

mod s3_store;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dawr_core::{Action, DawrConfig};
use dawr_sync::{execute, Account, AccountDefinition, S3Uri, SyncOptions};
use s3_store::{create_client, S3Store};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dawr")]
#[command(author = "Dawr Team")]
#[command(version = dawr_core::VERSION)]
#[command(about = "Reconcile declared S3 lifecycle policies with live buckets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Declaration documents URI, e.g. s3://bucket/prefix/
    #[arg(long, global = true, env = "DAWR_ENDPOINT")]
    endpoint: Option<String>,

    /// AWS account number
    #[arg(long, global = true, env = "DAWR_AWS_ACCOUNT")]
    account: Option<String>,

    /// AWS region
    #[arg(long, global = true, env = "DAWR_AWS_REGION")]
    region: Option<String>,

    /// Custom S3 endpoint URL (for S3-compatible stores)
    #[arg(long, global = true, env = "DAWR_S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DAWR_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile declared lifecycle policies with live buckets
    Sync {
        /// Compute and report changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    let mut config = DawrConfig::from_env()?;

    // Override with CLI args
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(account) = cli.account {
        config.account = Some(account);
    }
    if let Some(region) = cli.region {
        config.region = region;
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("dawr {}", dawr_core::VERSION);
        }
        Some(Commands::Sync { dry_run }) => {
            run_sync(&config, cli.s3_endpoint.as_deref(), dry_run).await?;
        }
        // No subcommand: run the actions configured in the environment.
        None => {
            for action in config.actions.clone() {
                match action {
                    Action::Sync => run_sync(&config, cli.s3_endpoint.as_deref(), false).await?,
                    Action::DryRun => run_sync(&config, cli.s3_endpoint.as_deref(), true).await?,
                }
            }
        }
    }

    Ok(())
}

async fn run_sync(config: &DawrConfig, s3_endpoint: Option<&str>, dry_run: bool) -> anyhow::Result<()> {
    let endpoint = config
        .endpoint
        .as_deref()
        .context("No declaration endpoint configured. Set DAWR_ENDPOINT or pass --endpoint")?;
    let uri = S3Uri::parse(endpoint)?;
    info!(
        endpoint = %uri,
        region = %config.region,
        account = config.account.as_deref().unwrap_or("-"),
        dry_run,
        "Starting lifecycle sync"
    );

    let client = create_client(&config.region, s3_endpoint).await;
    let store = Arc::new(S3Store::new(client));

    let mut definition = AccountDefinition::new(uri, store.clone());
    definition.load().await?;

    let mut account = Account::new(store);
    account.load().await?;

    let report = execute(&definition, &mut account, &SyncOptions { dry_run }).await?;
    println!(
        "Synced {} buckets: {} rules added, {} removed, {} failed{}",
        report.buckets,
        report.added,
        report.removed,
        report.failed,
        if dry_run { " (dryrun)" } else { "" }
    );

    Ok(())
}
