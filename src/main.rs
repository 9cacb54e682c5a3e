//! CLI entry point for the Ayna bus scraper.
//!
//! With no subcommand it runs the full two-stage scrape and writes the
//! result to a JSON file. `list` only fetches the bus list.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ayna_bus_scraper::config::{
    DEFAULT_BASE_URL, DEFAULT_OUTPUT, RequestHeaders, ScrapeConfig,
};
use ayna_bus_scraper::fetch::{BasicClient, StaticHeaders};
use ayna_bus_scraper::infra::ayna::AynaClient;
use ayna_bus_scraper::output;
use ayna_bus_scraper::scrape::{self, Scraper};
use ayna_bus_scraper::services::BusApi;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ayna_bus_scraper")]
#[command(about = "Scrape bus stops and route geometry from the Ayna map API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the bus API
    #[arg(long, env = "AYNA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// JSON file to write the collected buses to
    #[arg(short, long, env = "AYNA_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Pause between detail requests, in milliseconds
    #[arg(short, long, env = "AYNA_DELAY_MS", default_value_t = 500)]
    delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, env = "AYNA_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Override the User-Agent sent to the API
    #[arg(long, env = "AYNA_USER_AGENT")]
    user_agent: Option<String>,

    /// Optional: CSV file to append a run summary row to
    #[arg(long, env = "AYNA_HISTORY_CSV")]
    history: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Fetch every bus and save the result (default)
    Scrape,
    /// Only fetch and log the bus list
    List,
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        let mut headers = RequestHeaders::default();
        if let Some(user_agent) = &self.user_agent {
            headers.user_agent = user_agent.clone();
        }

        ScrapeConfig {
            base_url: self.base_url.clone(),
            headers,
            timeout: Duration::from_secs(self.timeout_secs),
            pacing_delay: Duration::from_millis(self.delay_ms),
            output: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();
    let config = cli.scrape_config();

    let http = StaticHeaders::new(BasicClient::new(config.timeout)?, &config.headers)
        .context("Invalid request header value")?;
    let api = AynaClient::new(config.base_url.clone(), http);
    let scraper = Scraper::new(&api);

    match cli.command.unwrap_or(Commands::Scrape) {
        Commands::Scrape => {
            info!(base_url = %config.base_url, output = %config.output.display(), "Bus Data Scraper - Ayna.gov.az");
            run_scrape(&scraper, &config, cli.history.as_deref()).await?;
        }
        Commands::List => {
            let stubs = scraper.list_only().await?;
            for stub in &stubs {
                info!(id = stub.id, label = %stub.label, "Bus");
            }
            info!(total = stubs.len(), "Bus list summary");
        }
    }

    Ok(())
}

/// Colored stderr plus a JSON rolling log file.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/ayna_bus_scraper.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ayna_bus_scraper.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Runs the pipeline, then hands the outcome to [`scrape::finish`].
///
/// The first Ctrl+C stops the run and keeps what was collected; a second one
/// aborts the process immediately.
async fn run_scrape<A: BusApi>(
    scraper: &Scraper<'_, A>,
    config: &ScrapeConfig,
    history: Option<&Path>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if scrape::forward_interrupts(tokio::signal::ctrl_c, shutdown_tx).await {
            std::process::exit(130);
        }
    });

    let outcome = scraper
        .run_pipeline(config.pacing_delay, shutdown_rx)
        .await
        .context("Fatal error: could not fetch the bus list")?;

    let stats = scrape::finish(outcome, config).context("Error saving bus data")?;

    output::print_json(&stats)?;
    if let Some(path) = history {
        output::append_record(path, &stats)?;
    }

    Ok(())
}
