mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dealscout_core::Source;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealscout-cli")]
#[command(about = "Search Amazon and Flipkart from a plain-language shopping query")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan, scrape, rank and print results for a query as JSON.
    Search {
        query: String,
        /// Worker executable; defaults to this binary.
        #[arg(long)]
        worker: Option<PathBuf>,
    },
    /// Serve extraction tool calls on stdin/stdout.
    Worker,
    /// Print feature bullets and description for a product page.
    Details {
        url: String,
        #[arg(long, default_value = "amazon")]
        platform: Source,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // A worker runs with its parent's environment; re-reading .env would
    // restore the inference key the parent stripped.
    if !matches!(cli.command, Commands::Worker) {
        dotenvy::dotenv().ok();
    }
    let config = dealscout_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries results (and protocol lines for the worker), so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search { query, worker } => {
            commands::run_search(&config, &query, worker).await
        }
        Commands::Worker => commands::run_worker(&config).await,
        Commands::Details { url, platform } => {
            commands::run_details(&config, &url, platform).await
        }
    }
}
