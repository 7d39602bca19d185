use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use macroscope::models::{AnalyzerConfig, Credentials};
use macroscope::pipeline::render_text;
use macroscope::sources::browser::check_browser_available;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/macroscope.toml";

#[derive(Parser, Debug)]
#[command(name = "macroscope", about = "Macro liquidity and crypto market monitor")]
struct Cli {
    /// Path to configuration file. Defaults apply when omitted and
    /// config/macroscope.toml is absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Pretty-print the JSON report
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Exit non-zero when any indicator failed
    #[arg(long)]
    fail_on_error: bool,
}

fn resolve_config(path: Option<&PathBuf>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => macroscope::load_config(path),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG);
            if fallback.exists() {
                macroscope::load_config(&fallback)
            } else {
                Ok(AnalyzerConfig::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Credentials may live in a local .env file
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }
    let credentials = Credentials::from_env();

    let config = resolve_config(cli.config.as_ref())?;

    if !check_browser_available(&config.fetch.browser_binary).await {
        warn!(
            binary = %config.fetch.browser_binary,
            "Browser not available; rendered pages will fail"
        );
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            on_signal.cancel();
        }
    });

    let report = macroscope::run(&config, credentials, &cancel)
        .await
        .context("Analysis failed")?;

    let output = if cli.json {
        if cli.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        }
    } else {
        render_text(&report)
    };
    println!("{output}");

    if cli.fail_on_error && report.has_errors() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
