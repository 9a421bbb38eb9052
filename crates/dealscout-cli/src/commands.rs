//! Subcommand handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use dealscout_agent::{run_query, ChatClient, ProcessLauncher};
use dealscout_core::{AppConfig, ExtractionDefaults, Source};
use dealscout_scraper::{serve, Scraper};
use tokio::io::BufReader;

/// Resolves the worker executable: an explicit path, else this binary.
pub(crate) fn worker_program(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => std::env::current_exe().context("failed to locate the current executable"),
    }
}

/// Runs the whole query pipeline locally and prints the result set.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    worker: Option<PathBuf>,
) -> anyhow::Result<()> {
    let program = worker_program(worker)?;
    let launcher = ProcessLauncher::new(
        program.to_string_lossy(),
        vec!["worker".to_owned()],
        Duration::from_secs(config.worker_timeout_secs),
    );
    let inference = ChatClient::from_config(config)?;

    let results = run_query(&inference, &launcher, query, &ExtractionDefaults::default()).await?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Answers tool calls line by line until stdin closes.
pub(crate) async fn run_worker(config: &AppConfig) -> anyhow::Result<()> {
    let scraper = Scraper::from_config(config)?;
    tracing::info!(pid = std::process::id(), "extraction worker ready");

    serve(
        &scraper,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .context("worker protocol stream failed")?;

    tracing::info!("extraction worker stdin closed; exiting");
    Ok(())
}

pub(crate) async fn run_details(
    config: &AppConfig,
    url: &str,
    platform: Source,
) -> anyhow::Result<()> {
    let scraper = Scraper::from_config(config)?;
    let details = scraper
        .details(url, platform)
        .await
        .with_context(|| format!("failed to fetch details for {url}"))?;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
