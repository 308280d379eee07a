#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use bridge_common::GatewayConfig;
use bridge_gateway::AppState;
use bridge_gateway::router;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn test_config() -> GatewayConfig {
    GatewayConfig {
        access_token: Some("test-token".to_string()),
        port: 0,
        debug: false,
        vendor_base_url: "https://example.invalid".to_string(),
        client_version: "0.0.0".to_string(),
        session_timeout: std::time::Duration::from_secs(1),
        listener_idle_timeout: std::time::Duration::from_secs(1),
    }
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = router(AppState::new(test_config()));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn models_endpoint_lists_known_models() {
    let app = router(AppState::new(test_config()));
    let response = app
        .oneshot(Request::get("/v1/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["object"], "list");
    assert!(!json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_completions_rejects_an_empty_message_array() {
    let app = router(AppState::new(test_config()));
    let request = Request::post("/v1/chat/completions")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"model":"gpt-4o","messages":[]}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
