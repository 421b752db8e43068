use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use menudb::config::DatabaseConfig;
use tower::ServiceExt;

/// Router whose pool points at a port nothing listens on.
fn unreachable_app() -> axum::Router {
    let cfg = DatabaseConfig {
        url: Some("postgres://app:pw@127.0.0.1:1/restaurant".to_string()),
        ssl: Some(false),
        connect_timeout_secs: 1,
        ..DatabaseConfig::default()
    };
    let pool = menudb::db::lazy_pool(&cfg).expect("failed to build lazy pool");
    let state = menudb::router::MenuState::new(pool);
    menudb::router::menu_router(state)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body was not JSON")
    };
    (status, json)
}

#[tokio::test]
async fn test_route_answers_without_database() {
    let (status, body) = get(unreachable_app(), "/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Server is running");
    let ts = body["timestamp"].as_str().expect("timestamp missing");
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let (status, body) = get(unreachable_app(), "/api/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Database connection failed");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn categories_error_body_is_standardized() {
    let (status, body) = get(unreachable_app(), "/api/menu/categories").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "DATABASE_UNAVAILABLE");
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let (status, _) = get(unreachable_app(), "/api/menu/items").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
