use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scout_client::ChromeSessionFactory;
use scout_core::config::ScraperConfig;
use scout_core::delay::HumanDelay;
use scout_core::models::{DEFAULT_LOCATION, JobRecord};
use scout_core::{ExportFormat, ScrapeService, SearchQuery};

#[derive(Parser)]
#[command(name = "scout", version, about = "Indeed job scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Indeed and print the results as JSON
    Scrape {
        /// Job title or keywords to search for
        #[arg(short, long)]
        job_title: String,

        /// Location to search in
        #[arg(short, long, default_value = DEFAULT_LOCATION)]
        location: String,

        /// Number of result pages to visit (1-10)
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Export format for --output
        #[arg(short, long, env = "SCOUT_EXPORT_FORMAT", default_value = "csv", value_parser = parse_format)]
        format: ExportFormat,

        /// Write the records to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the browser window (overrides SCOUT_HEADLESS)
        #[arg(long, default_value_t = false)]
        headed: bool,
    },
}

fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    raw.parse().map_err(|e: scout_core::AppError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout_core=info,scout_client=info,scout=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            job_title,
            location,
            pages,
            format,
            output,
            headed,
        } => {
            let mut config = ScraperConfig::from_env().context("Invalid scraper configuration")?;
            if headed {
                config.headless = false;
            }
            let query = SearchQuery::new(job_title, location, pages);
            cmd_scrape(config, &query, format, output.as_deref()).await?;
        }
    }

    Ok(())
}

async fn cmd_scrape(
    config: ScraperConfig,
    query: &SearchQuery,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let service = ScrapeService::new(ChromeSessionFactory::new(config.clone()), HumanDelay)
        .with_retry(config.retry_config())
        .with_strategy(config.extraction_mode.forced_strategy());

    let result = service.scrape(query).await.map_err(|e| anyhow::anyhow!(e))?;

    if result.success {
        tracing::info!("{}", result.message);
    } else {
        tracing::warn!("{}", result.message);
    }

    if let Some(path) = output {
        write_export(path, format, &result.jobs)?;
        tracing::info!(path = %path.display(), %format, records = result.jobs.len(), "Export written");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        anyhow::bail!("Scrape failed: {}", result.message);
    }
    Ok(())
}

fn write_export(path: &Path, format: ExportFormat, records: &[JobRecord]) -> Result<()> {
    let bytes = format.render(records).map_err(|e| anyhow::anyhow!(e))?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write export file: {}", path.display()))
}
