/// Smoke-test for `ChromeSessionFactory`.
///
/// Launches Chromium, runs a one-page Indeed search, and prints the first few
/// records.
///
/// Run with:
///   cargo run -p scout-client --example browser_smoke -- "Rust Developer"
use scout_client::ChromeSessionFactory;
use scout_core::config::ScraperConfig;
use scout_core::delay::HumanDelay;
use scout_core::{ScrapeService, SearchQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let title = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Software Engineer".to_string());

    let config = ScraperConfig::from_env()?;
    let service = ScrapeService::new(ChromeSessionFactory::new(config.clone()), HumanDelay)
        .with_retry(config.retry_config());

    println!("Searching Indeed for {title:?} …");
    let result = service.scrape(&SearchQuery::for_title(title)).await?;

    println!("{} ({} jobs)", result.message, result.total_jobs);
    for job in result.jobs.iter().take(5) {
        println!("- {} @ {} [{}]", job.title, job.company, job.location);
    }
    Ok(())
}
