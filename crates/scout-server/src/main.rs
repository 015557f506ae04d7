use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use scout_client::ChromeSessionFactory;
use scout_core::config::ScraperConfig;
use scout_core::delay::HumanDelay;
use scout_core::error::AppError;
use scout_core::store::DEFAULT_CAPACITY;
use scout_core::{ResultStore, ScrapeService};
use scout_server::routes;
use scout_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout_core=info,scout_client=info,scout_server=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    let port = std::env::var("SCOUT_SERVER_PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let session_ttl = session_ttl_from_env()?;

    let config = ScraperConfig::from_env()?;
    tracing::info!(
        headless = config.headless,
        max_retries = config.max_retries,
        mode = ?config.extraction_mode,
        "Scraper configured"
    );
    let service = ScrapeService::new(ChromeSessionFactory::new(config.clone()), HumanDelay)
        .with_retry(config.retry_config())
        .with_strategy(config.extraction_mode.forced_strategy());

    let state = Arc::new(AppState::new(
        Arc::new(service),
        ResultStore::new(session_ttl, DEFAULT_CAPACITY),
    ));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// `SCOUT_SESSION_TTL_SECS` (optional, defaults to 3600).
fn session_ttl_from_env() -> Result<Duration, AppError> {
    match std::env::var("SCOUT_SESSION_TTL_SECS") {
        Err(_) => Ok(scout_core::store::DEFAULT_TTL),
        Ok(raw) => {
            let secs: u64 = raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid SCOUT_SESSION_TTL_SECS '{raw}': must be a positive integer"
                ))
            })?;
            if secs == 0 {
                return Err(AppError::ConfigError(
                    "SCOUT_SESSION_TTL_SECS must be at least 1".into(),
                ));
            }
            Ok(Duration::from_secs(secs))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
