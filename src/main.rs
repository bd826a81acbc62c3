//! Rakusatsu command-line interface
//!
//! Runs one closed-auction search for a seller and renders the engine's
//! progress events to the terminal.

use anyhow::bail;
use clap::Parser;
use rakusatsu::config::{load_config, validate, Config};
use rakusatsu::engine::run_search;
use rakusatsu::events::{EventSink, ProgressEvent};
use rakusatsu::output::render::print_outcome;
use rakusatsu::query::SearchQuery;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Harvest closed-auction sale records for a seller
#[derive(Parser, Debug)]
#[command(name = "rakusatsu")]
#[command(version = "1.0.0")]
#[command(about = "Closed-auction sale harvester", long_about = None)]
struct Cli {
    /// Seller page URL (must carry auc_user_id)
    #[arg(value_name = "SELLER_URL")]
    seller_url: String,

    /// Keyword filter over item titles; empty matches everything
    #[arg(short, long, default_value = "")]
    keyword: String,

    /// Cap on the number of detail pages fetched after filtering
    #[arg(short, long)]
    limit: Option<usize>,

    /// Path to a TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("loading configuration from {}", path.display());
            load_config(path)?
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            config
        }
    };

    let query = SearchQuery {
        seller_url: cli.seller_url,
        keyword: cli.keyword,
        limit: cli.limit,
    };

    let cancel = CancellationToken::new();
    let (sink, mut events) = EventSink::channel(cancel.clone());

    // Ctrl-C stops scheduling new work; in-flight fetches finish
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping search");
            interrupt.cancel();
        }
    });

    let engine = {
        let config = config.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { run_search(&query, &config, &sink, &cancel).await })
    };

    let mut failed = false;
    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Status { message } => tracing::info!("{}", message),
            ProgressEvent::Total { total, message } => {
                tracing::info!(total, "{}", message);
            }
            ProgressEvent::Progress {
                current,
                total,
                percentage,
            } => {
                tracing::info!("fetched {}/{} ({}%)", current, total, percentage);
            }
            ProgressEvent::Complete { data } => print_outcome(&data),
            ProgressEvent::Error { error, details } => {
                tracing::error!(details = %details, "{}", error);
                failed = true;
            }
        }
    }

    engine.await??;

    if failed {
        bail!("search ended with an error");
    }
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rakusatsu=info,warn"),
            1 => EnvFilter::new("rakusatsu=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
