use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

mod common;

use common::{send, setup_seeded_app};

async fn get_text(uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let app = setup_seeded_app();
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn can_render_index_page() {
    let (status, headers, body) = get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(body.contains("<option value=\"Воскресенье\">Воскресенье</option>"));
    assert!(body.contains("<option value=\"средний\" selected>средний</option>"));
    assert!(body.contains("<option value=\"новая\" selected>новая</option>"));
}

#[tokio::test]
async fn can_check_health_endpoint() {
    let (status, _, body) = get_text("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn can_serve_static_stylesheet() {
    let (status, headers, body) = get_text("/static/styles.css").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/css");
    assert!(body.contains(".status-in-progress"));
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let (status, _, body) = get_text("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    let doc: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(doc["paths"]["/api/tasks"]["get"].is_object());
    assert!(doc["paths"]["/api/tasks"]["post"].is_object());
    assert!(doc["paths"]["/api/tasks/{id}"]["delete"].is_object());
    assert!(doc["paths"]["/api/tasks/stats/summary"]["get"].is_object());
}

#[tokio::test]
async fn can_answer_unknown_route() {
    let app = setup_seeded_app();

    let (status, json) = send(&app, "GET", "/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json,
        serde_json::json!({
            "success": false,
            "message": "Маршрут не найден",
            "path": "/api/unknown",
            "method": "GET",
        })
    );
}

#[tokio::test]
async fn can_allow_cross_origin_requests() {
    let app = setup_seeded_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/tasks")
        .header("origin", "http://example.com")
        .header("access-control-request-method", "PUT")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn can_answer_missing_static_file_with_route_not_found() {
    let app = setup_seeded_app();

    let (status, json) = send(&app, "GET", "/static/missing.css").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json,
        serde_json::json!({
            "success": false,
            "message": "Маршрут не найден",
            "path": "/static/missing.css",
            "method": "GET",
        })
    );
}
