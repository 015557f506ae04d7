use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use scout_core::delay::NoDelay;
use scout_core::retry::RetryConfig;
use scout_core::testutil::{FakePage, FakeSession, FakeSessionFactory, job_card, job_cards};
use scout_core::{AppError, ResultStore, ScrapeService};
use scout_server::routes;
use scout_server::state::AppState;

pub const CARDS: &str = "li.css-5lfssm";

pub struct TestApp {
    pub router: Router,
    pub factory: FakeSessionFactory,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Router backed by a scripted browser session.
pub fn setup_test_app(session: FakeSession) -> TestApp {
    build(FakeSessionFactory::new(session), ResultStore::default())
}

/// Like [`setup_test_app`], sharing `store` with other test apps.
pub fn setup_test_app_with_store(session: FakeSession, store: ResultStore) -> TestApp {
    build(FakeSessionFactory::new(session), store)
}

/// Router whose browser never launches.
pub fn setup_test_app_launch_error() -> TestApp {
    build(
        FakeSessionFactory::with_launch_error(AppError::BrowserError(
            "Chrome binary not found".into(),
        )),
        ResultStore::default(),
    )
}

fn build(factory: FakeSessionFactory, store: ResultStore) -> TestApp {
    let service = ScrapeService::new(factory.clone(), NoDelay)
        .with_retry(RetryConfig::default().with_backoff_factor(Duration::ZERO));
    let state = Arc::new(AppState::new(Arc::new(service), store));
    TestApp {
        router: routes::router(state),
        factory,
    }
}

/// One results page of `count` cards and no pagination.
pub fn single_page(count: usize) -> FakeSession {
    FakeSession::new().with_page(FakePage::new().with_cards(CARDS, job_cards("Engineer", count)))
}

/// Cards from a mix of companies and locations.
pub fn mixed_page() -> FakeSession {
    let cards = vec![
        job_card("Rust Engineer", "Acme", "Remote", "/rc/clk?jk=1"),
        job_card("Backend Engineer", "Globex", "Berlin", "/rc/clk?jk=2"),
        job_card("Platform Engineer", "Acme", "Remote", "/rc/clk?jk=3"),
        job_card("Data Engineer", "Acme", "Austin, TX", "/rc/clk?jk=4"),
        job_card("Ingénieur Systèmes", "Société Générale", "Paris", "/rc/clk?jk=5"),
    ];
    FakeSession::new().with_page(FakePage::new().with_cards(CARDS, cards))
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
