use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::Utc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use scout_core::analytics::summarize;
use scout_core::{AppError, ExportFormat};

use crate::dto::{
    AnalyticsResponse, EndpointInfo, ErrorResponse, HealthResponse, RootResponse, ScrapeRequest,
    ScrapeResponse, SessionQuery, StatsResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::timing::track_process_time;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scrape requests are tiny; anything larger is rejected before parsing.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/scrape", post(scrape))
        .route("/download/csv", get(download_csv))
        .route("/download/excel", get(download_excel))
        .route("/download/json", get(download_json))
        .route("/stats", get(stats))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public
        .merge(api)
        .layer(middleware::from_fn(track_process_time))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Scrape finished (check `success`)", body = ScrapeResponse),
        (status = 400, description = "Invalid job title or page count", body = ErrorResponse),
        (status = 500, description = "Browser or internal failure", body = ErrorResponse),
    ),
    tag = "scrape"
)]
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<ScrapeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = body.query()?;
    query.validate()?;

    let session_id = body
        .session_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(
        session = %session_id,
        job_title = %query.job_title,
        location = %query.location,
        pages = query.pages,
        "Scrape request received"
    );

    let result = match state.runner.run(&query).await {
        Ok(result) => result,
        Err(e) => {
            state.store.reset(&session_id).await;
            return Err(AppError::Generic(format!("Scraping failed: {e}")).into());
        }
    };

    if result.success {
        state.store.put(&session_id, result.jobs.clone()).await;
    } else {
        tracing::warn!(session = %session_id, message = %result.message, "Scrape unsuccessful");
        state.store.reset(&session_id).await;
    }

    Ok(axum::Json(ScrapeResponse::new(result, session_id)))
}

// ---------------------------------------------------------------------------
// Downloads
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/download/csv",
    params(SessionQuery),
    responses(
        (status = 200, description = "CSV attachment `indeed-jobs.csv`"),
        (status = 404, description = "No data available", body = ErrorResponse),
    ),
    tag = "downloads"
)]
pub async fn download_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    download(&state, query, ExportFormat::Csv).await
}

#[utoipa::path(
    get,
    path = "/download/excel",
    params(SessionQuery),
    responses(
        (status = 200, description = "XLSX attachment `indeed-jobs.xlsx`"),
        (status = 404, description = "No data available", body = ErrorResponse),
    ),
    tag = "downloads"
)]
pub async fn download_excel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    download(&state, query, ExportFormat::Excel).await
}

#[utoipa::path(
    get,
    path = "/download/json",
    params(SessionQuery),
    responses(
        (status = 200, description = "JSON attachment `indeed-jobs.json`"),
        (status = 404, description = "No data available", body = ErrorResponse),
    ),
    tag = "downloads"
)]
pub async fn download_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    download(&state, query, ExportFormat::Json).await
}

async fn download(
    state: &AppState,
    query: SessionQuery,
    format: ExportFormat,
) -> Result<Response, ApiError> {
    let records = match state.store.get(query.session.as_deref()).await {
        Some(records) if !records.is_empty() => records,
        _ => {
            tracing::warn!(session = ?query.session, %format, "No data available for download");
            let body = ErrorResponse {
                error: "not_found".to_string(),
                message: "No data available. Please scrape jobs first.".to_string(),
            };
            return Ok((StatusCode::NOT_FOUND, axum::Json(body)).into_response());
        }
    };

    let bytes = format.render(&records)?;
    tracing::info!(%format, records = records.len(), bytes = bytes.len(), "Export generated");

    let disposition = format!("attachment; filename={}", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/stats",
    params(SessionQuery),
    responses(
        (status = 200, description = "Record counts and top companies/locations", body = StatsResponse),
    ),
    tag = "system"
)]
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    let records = state.store.get(query.session.as_deref()).await;
    let count = records.as_ref().map_or(0, |r| r.len());
    let analytics = records
        .filter(|r| !r.is_empty())
        .map(|r| AnalyticsResponse::from(summarize(&r)));

    axum::Json(StatsResponse {
        current_jobs_count: count,
        has_data: count > 0,
        timestamp: Utc::now(),
        analytics,
    })
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "healthy",
        version: VERSION,
        current_jobs_count: state.store.count(None).await,
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = RootResponse),
    ),
    tag = "system"
)]
pub async fn root() -> impl IntoResponse {
    let endpoints = [
        ("POST", "/scrape"),
        ("GET", "/download/csv"),
        ("GET", "/download/excel"),
        ("GET", "/download/json"),
        ("GET", "/stats"),
        ("GET", "/health"),
        ("GET", "/swagger-ui"),
    ]
    .into_iter()
    .map(|(method, path)| EndpointInfo { method, path })
    .collect();

    axum::Json(RootResponse {
        message: "Indeed Job Scraper API is running!",
        version: VERSION,
        status: "healthy",
        endpoints,
    })
}
