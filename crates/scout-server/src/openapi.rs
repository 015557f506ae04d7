use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scout API",
        description = "Indeed job scraper driven by a headless Chromium session."
    ),
    paths(
        crate::routes::scrape,
        crate::routes::download_csv,
        crate::routes::download_excel,
        crate::routes::download_json,
        crate::routes::stats,
        crate::routes::health,
        crate::routes::root,
    ),
    components(schemas(
        crate::dto::ScrapeRequest,
        crate::dto::ScrapeResponse,
        crate::dto::JobResponse,
        crate::dto::ScrapeStatsResponse,
        crate::dto::StatsResponse,
        crate::dto::AnalyticsResponse,
        crate::dto::FrequencyResponse,
        crate::dto::HealthResponse,
        crate::dto::RootResponse,
        crate::dto::EndpointInfo,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "scrape", description = "Run a job search"),
        (name = "downloads", description = "Export the latest results"),
        (name = "system", description = "Health, stats and service info"),
    )
)]
pub struct ApiDoc;
