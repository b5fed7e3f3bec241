//! Product-Scraper main entry point
//!
//! Starts the scrape service: loads the configuration, builds the session,
//! starts the progress poller, and serves the control and download endpoints.

use anyhow::Context;
use clap::Parser;
use product_scraper::config::{load_config_or_default, CONFIG_FILE_NAME};
use product_scraper::crawler::{poll_progress, ScrapeSession};
use product_scraper::server::start_server;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Product-Scraper: a cancellable paginated catalog scraper
///
/// Serves start/stop/progress controls and the latest spreadsheet export.
/// Settings come from `product-scraper.toml` in the working directory when
/// present, otherwise from built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "product-scraper")]
#[command(version)]
#[command(about = "A cancellable paginated catalog scraper", long_about = None)]
struct Cli {
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

    let config = load_config_or_default(Path::new(CONFIG_FILE_NAME))
        .context("failed to load configuration")?;
    tracing::info!("Catalog root: {}", config.site.base_url);
    tracing::info!(
        "Exports: {}/{}",
        config.output.export_dir,
        config.output.export_file
    );

    let session =
        Arc::new(ScrapeSession::from_config(&config).context("failed to build scrape session")?);

    let poller = tokio::spawn(poll_progress(
        session.state(),
        Duration::from_millis(config.server.poll_interval_ms),
    ));

    let served = start_server(&config, Arc::clone(&session)).await;
    poller.abort();

    served.context("server failed")
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => EnvFilter::new("product_scraper=info,warn"),
            1 => EnvFilter::new("product_scraper=debug,tower_http=debug,info"),
            _ => EnvFilter::new("product_scraper=trace,debug"),
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
