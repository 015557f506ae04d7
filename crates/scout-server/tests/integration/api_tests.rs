use axum::http::{StatusCode, header};
use serde_json::json;

use scout_core::ResultStore;
use scout_core::testutil::{FakePage, FakeSession};
use scout_server::timing::PROCESS_TIME_HEADER;

use crate::integration::common::{
    body_bytes, body_json, get, mixed_page, post_json, setup_test_app,
    setup_test_app_launch_error, setup_test_app_with_store, single_page,
};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app(single_page(1));

    let response = app.send(get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["current_jobs_count"], 0);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn responses_carry_process_time() {
    let app = setup_test_app(single_page(1));

    for response in [
        app.send(get("/health")).await,
        app.send(get("/download/csv")).await,
    ] {
        let value = response.headers()[PROCESS_TIME_HEADER].to_str().unwrap();
        let secs: f64 = value.parse().unwrap();
        assert!(secs >= 0.0);
    }
}

#[tokio::test]
async fn root_lists_endpoints() {
    let app = setup_test_app(single_page(1));

    let json = body_json(app.send(get("/")).await).await;

    assert_eq!(json["message"], "Indeed Job Scraper API is running!");
    let paths: Vec<&str> = json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/scrape"));
    assert!(paths.contains(&"/download/excel"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app(single_page(1));

    let response = app.send(get("/api-docs/openapi.json")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/scrape"].is_object());
    assert!(json["paths"]["/download/csv"].is_object());
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_job_title_returns_400_without_launching() {
    let app = setup_test_app(single_page(3));

    let response = app
        .send(post_json("/scrape", json!({"job_title": "   ", "location": "Remote", "pages": 1})))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("Job title cannot be empty"));
    assert_eq!(app.factory.launches(), 0);
}

#[tokio::test]
async fn page_count_out_of_range_returns_400() {
    let app = setup_test_app(single_page(3));

    for pages in [-1_i64, 0, 11, 4_294_967_296] {
        let response = app
            .send(post_json("/scrape", json!({"job_title": "Software Engineer", "pages": pages})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "pages = {pages}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].as_str().unwrap().contains("Pages must be between 1 and 10"));
    }
    assert_eq!(app.factory.launches(), 0);
}

#[tokio::test]
async fn missing_job_title_is_rejected() {
    let app = setup_test_app(single_page(3));

    let response = app.send(post_json("/scrape", json!({"location": "Remote"}))).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.factory.launches(), 0);
}

// ---------------------------------------------------------------------------
// Scrape + downloads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn downloads_before_scrape_return_404() {
    let app = setup_test_app(single_page(3));

    for uri in ["/download/csv", "/download/excel", "/download/json"] {
        let response = app.send(get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["message"], "No data available. Please scrape jobs first.");
    }
}

#[tokio::test]
async fn scrape_then_download_csv() {
    let app = setup_test_app(single_page(15));

    let response = app
        .send(post_json(
            "/scrape",
            json!({"job_title": "Software Engineer", "location": "Remote", "pages": 1}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["total_jobs"], 15);
    assert_eq!(json["pages_scraped"], 1);
    assert_eq!(json["jobs"].as_array().unwrap().len(), 15);
    assert_eq!(json["jobs"][0]["Title"], "Engineer 1");
    assert_eq!(json["jobs"][0]["Link"], "https://www.indeed.com/rc/clk?jk=Engineer1");
    assert!(!json["session_id"].as_str().unwrap().is_empty());
    assert_eq!(json["stats"]["records_found"], 15);

    let response = app.send(get("/download/csv")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=indeed-jobs.csv"
    );
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Title,Company,Location,Link");
    assert_eq!(lines.len(), 16);
}

#[tokio::test]
async fn scrape_then_download_json_and_excel_by_session() {
    let app = setup_test_app(mixed_page());

    let json = body_json(
        app.send(post_json(
            "/scrape",
            json!({"job_title": "Engineer", "session_id": "team-a"}),
        ))
        .await,
    )
    .await;
    assert_eq!(json["session_id"], "team-a");

    let response = app.send(get("/download/json?session=team-a")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=indeed-jobs.json"
    );
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("Ingénieur Systèmes"));
    let records: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 5);
    assert_eq!(records[1]["Company"], "Globex");

    let response = app.send(get("/download/excel?session=team-a")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=indeed-jobs.xlsx"
    );
    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");

    let response = app.send(get("/download/json?session=unknown")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn defaults_apply_when_location_and_pages_omitted() {
    let app = setup_test_app(single_page(2));

    let json = body_json(
        app.send(post_json("/scrape", json!({"job_title": "Data Scientist"})))
            .await,
    )
    .await;

    assert_eq!(json["success"], true);
    assert_eq!(json["pages_scraped"], 1);
    let calls = app.factory.session().calls();
    assert!(calls.contains(&r#"clear+type:input[id="text-input-where"]:Remote"#.to_string()));
}

#[tokio::test]
async fn sessions_are_kept_apart() {
    let app = setup_test_app(single_page(4));

    for session in ["a", "b"] {
        let response = app
            .send(post_json(
                "/scrape",
                json!({"job_title": "Engineer", "session_id": session}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    for session in ["a", "b"] {
        let json = body_json(app.send(get(&format!("/stats?session={session}"))).await).await;
        assert_eq!(json["current_jobs_count"], 4);
    }
    assert_eq!(app.factory.launches(), 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_listings_returns_unsuccessful_result() {
    let app = setup_test_app(FakeSession::new().with_page(FakePage::new()));

    let response = app
        .send(post_json("/scrape", json!({"job_title": "Software Engineer"})))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "No job listings found. The page structure may have changed."
    );
    assert_eq!(json["total_jobs"], 0);
    assert_eq!(json["pages_scraped"], 0);
    assert!(json["jobs"].as_array().unwrap().is_empty());

    let response = app.send(get("/download/csv")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_scrape_resets_stored_results() {
    let store = ResultStore::default();
    let working = setup_test_app_with_store(single_page(5), store.clone());
    let broken = setup_test_app_with_store(FakeSession::new().with_page(FakePage::new()), store);

    let request = json!({"job_title": "Software Engineer", "session_id": "shared"});
    let response = working.send(post_json("/scrape", request.clone())).await;
    assert_eq!(body_json(response).await["total_jobs"], 5);
    assert_eq!(
        working.send(get("/download/csv?session=shared")).await.status(),
        StatusCode::OK
    );

    let response = broken.send(post_json("/scrape", request)).await;
    assert_eq!(body_json(response).await["success"], false);

    let response = working.send(get("/download/csv?session=shared")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let stats = body_json(working.send(get("/stats?session=shared")).await).await;
    assert_eq!(stats["current_jobs_count"], 0);
    assert_eq!(stats["has_data"], false);
}

#[tokio::test]
async fn browser_launch_failure_returns_500() {
    let app = setup_test_app_launch_error();

    let response = app
        .send(post_json("/scrape", json!({"job_title": "Software Engineer"})))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "internal_error");
    assert!(json["message"].as_str().unwrap().starts_with("Scraping failed:"));
    assert_eq!(app.factory.launches(), 1);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_without_data() {
    let app = setup_test_app(single_page(1));

    let json = body_json(app.send(get("/stats")).await).await;

    assert_eq!(json["current_jobs_count"], 0);
    assert_eq!(json["has_data"], false);
    assert!(json.get("analytics").is_none());
}

#[tokio::test]
async fn stats_report_top_companies_and_locations() {
    let app = setup_test_app(mixed_page());
    app.send(post_json("/scrape", json!({"job_title": "Engineer"})))
        .await;

    let json = body_json(app.send(get("/stats")).await).await;

    assert_eq!(json["current_jobs_count"], 5);
    assert_eq!(json["has_data"], true);
    let analytics = &json["analytics"];
    assert_eq!(analytics["unique_companies"], 3);
    assert_eq!(analytics["unique_locations"], 4);
    assert_eq!(analytics["top_companies"][0], json!({"name": "Acme", "count": 3}));
    assert_eq!(analytics["top_locations"][0], json!({"name": "Remote", "count": 2}));
    assert!(analytics["top_companies"].as_array().unwrap().len() <= 5);
}
