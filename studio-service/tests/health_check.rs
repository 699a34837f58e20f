mod common;

use axum::http::{header, StatusCode};
use common::{assert_status, body_json, TestApp};

#[tokio::test]
async fn api_root_says_hello() {
    let app = TestApp::new();

    for uri in ["/api/", "/api"] {
        let response = app.get(uri).await;

        assert_status(&response, StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "message": "Hello World" }));
    }
}

#[tokio::test]
async fn health_reports_ok_when_store_is_reachable() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "studio-service");
}

#[tokio::test]
async fn ready_returns_200() {
    let app = TestApp::new();

    let response = app.get("/ready").await;

    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_serves_text() {
    let app = TestApp::new();

    let response = app.get("/metrics").await;

    assert_status(&response, StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();

    let response = app.get("/api/").await;

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = TestApp::new();

    let response = app.get("/api/does-not-exist").await;

    assert_status(&response, StatusCode::NOT_FOUND);
}
