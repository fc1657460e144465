//! dashsync - Reconciles registry organizations and users into a
//! dashboarding backend

use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use tokio::sync::watch;

mod client;
mod config;
mod desired;
mod error;
mod sync;
mod template;

use client::{BackendClient, RegistryClient};
use config::{Config, SyncArgs};
use error::{ConfigError, Result};
use sync::Reconciler;
use template::DashboardTemplate;

#[derive(Parser)]
#[command(name = "dashsync", version, about = "Syncs registry users, teams, folders and dashboards into a visualization backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile on a fixed interval until interrupted
    Run {
        #[command(flatten)]
        args: SyncArgs,

        /// Seconds between cycle starts
        #[arg(long, env = "SYNC_INTERVAL_SECS", default_value_t = 300)]
        interval: u64,
    },
    /// Run a single reconciliation cycle and exit
    Once {
        #[command(flatten)]
        args: SyncArgs,
    },
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args, interval } => {
            if interval == 0 {
                return Err(
                    ConfigError::Invalid("interval must be at least 1 second".to_string()).into(),
                );
            }
            run_loop(&args, Duration::from_secs(interval)).await
        }
        Commands::Once { args } => run_once(&args).await,
        Commands::Version => {
            println!("dashsync version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_once(args: &SyncArgs) -> Result<()> {
    let config = Config::from_args(args)?;
    let template = DashboardTemplate::load(config.template_path.as_deref())?;
    let registry = RegistryClient::new(&config)?;
    let backend = BackendClient::new(&config)?;
    let reconciler = Reconciler::new(&config, &registry, &backend, &template);

    let (_tx, rx) = watch::channel(false);
    let summary = reconciler.run_cycle(&rx).await?;
    let elapsed = (Utc::now() - summary.started_at).num_seconds();
    info!("cycle complete in {elapsed}s: {summary}");
    Ok(())
}

async fn run_loop(args: &SyncArgs, interval: Duration) -> Result<()> {
    let config = Config::from_args(args)?;
    let template = DashboardTemplate::load(config.template_path.as_deref())?;
    let registry = RegistryClient::new(&config)?;
    let backend = BackendClient::new(&config)?;
    let reconciler = Reconciler::new(&config, &registry, &backend, &template);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    info!("reconciling every {}s", interval.as_secs());
    loop {
        match reconciler.run_cycle(&shutdown_rx).await {
            Ok(summary) if summary.interrupted => {
                info!("cycle interrupted by shutdown: {summary}");
                return Ok(());
            }
            Ok(summary) => {
                let elapsed = (Utc::now() - summary.started_at).num_seconds();
                info!("cycle complete in {elapsed}s: {summary}");
            }
            // A failed cycle leaves the backend in a state the next cycle
            // repairs, so the loop keeps going.
            Err(err) => warn!("cycle failed: {err}"),
        }

        if *shutdown_rx.borrow() {
            info!("shutting down");
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.changed() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}
