//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mechdeck_core::clock::Clock;
use mechdeck_core::rng::DeterministicRng;
use mechdeck_narrative::domain::loader::DirectoryStorySource;
use mechdeck_rewards::domain::catalog::JsonCardCatalog;
use mechdeck_store::memory::{InMemoryProgressRepository, InMemoryRewardLedger};
use mechdeck_test_support::{FixedClock, MockRng};
use tower::ServiceExt;

use mechdeck_api::state::AppState;

/// Workspace root, where the sample stories and card catalog live.
fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// App state over the sample content with in-memory stores and an RNG
/// that always picks the first candidate.
pub fn build_test_state() -> AppState {
    let root = workspace_root();
    let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(MockRng));
    AppState::new(
        fixed_clock(),
        rng,
        Arc::new(DirectoryStorySource::new(root.join("stories"))),
        Arc::new(JsonCardCatalog::from_path(root.join("data/cards.json")).unwrap()),
        Arc::new(InMemoryProgressRepository::new()),
        Arc::new(InMemoryRewardLedger::new()),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> Router {
    mechdeck_api::build_router(build_test_state())
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
