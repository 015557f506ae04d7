use std::time::Instant;

use axum::http::{HeaderName, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::Response;

/// Seconds spent handling the request, as a decimal string.
pub const PROCESS_TIME_HEADER: HeaderName = HeaderName::from_static("x-process-time");

/// Middleware that logs each request and stamps the handling time on the response.
pub async fn track_process_time(request: Request<axum::body::Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::info!(%method, %uri, %user_agent, "Request started");

    let mut response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    let size = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    tracing::info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        process_time = elapsed,
        size = %size,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}
