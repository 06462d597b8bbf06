#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use weekly_tasks_server::config::Config;
use weekly_tasks_server::web::{AppState, create_app};

/// Builds the full application with the sample week of tasks.
pub fn setup_seeded_app() -> Router {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    create_app(AppState::from_config(Config::default()))
}

/// Builds the full application with an empty task store.
pub fn setup_empty_app() -> Router {
    let _ = tracing_subscriber::fmt().try_init();
    create_app(AppState::from_config(Config {
        seed_tasks: false,
        ..Config::default()
    }))
}

/// Sends a request without a body and returns the status with the parsed JSON body.
pub async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    into_json(app, request).await
}

/// Sends a JSON body and returns the status with the parsed JSON body.
pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    into_json(app, request).await
}

pub async fn into_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}
