//! HTTP mapping of the session-details route
//!
//! Run with: cargo test --package bff-rs --test routes_test

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bff_rs::routes;
use common::{aggregator, coach, session, Script};
use failure_policy::Failure;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_ok_response_shape() {
    let id = Uuid::new_v4();
    let coach_id = Uuid::new_v4();
    let app = routes::router(Arc::new(aggregator(
        &Script::ok(session(id, coach_id)),
        &Script::ok(coach(coach_id)),
    )));

    let (status, json) = get(app, &format!("/v1/session-details/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["description"], "Hips and shoulders");
    assert_eq!(json["capacity"], 12);
    assert_eq!(json["start_at"], "2026-03-01T07:00:00Z");
    assert_eq!(json["end_at"], "2026-03-01T08:00:00Z");
    assert_eq!(json["coach"]["id"], coach_id.to_string());
    assert_eq!(json["coach"]["name"], "Ayu Lestari");
    assert!(json.get("coach_id").is_none());
}

#[tokio::test]
async fn test_degraded_coach_still_returns_ok() {
    let id = Uuid::new_v4();
    let coach_id = Uuid::new_v4();
    let app = routes::router(Arc::new(aggregator(
        &Script::ok(session(id, coach_id)),
        &Script::failing(Failure::Connection("connection refused".to_string())),
    )));

    let (status, json) = get(app, &format!("/v1/session-details/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["coach"]["id"], coach_id.to_string());
    assert!(json["coach"]["name"].is_null());
    assert!(json["coach"]["avatar_url"].is_null());
}

#[tokio::test]
async fn test_invalid_id_is_400() {
    let app = routes::router(Arc::new(aggregator(
        &Script::ok(session(Uuid::new_v4(), Uuid::new_v4())),
        &Script::ok(coach(Uuid::new_v4())),
    )));

    let (status, json) = get(app, "/v1/session-details/12345").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "Invalid session ID format" }));
}

#[tokio::test]
async fn test_missing_session_is_404() {
    let app = routes::router(Arc::new(aggregator(
        &Script::failing(Failure::NotFound),
        &Script::ok(coach(Uuid::new_v4())),
    )));

    let (status, json) = get(app, &format!("/v1/session-details/{}", Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session not found");
}

#[tokio::test]
async fn test_session_service_down_is_503() {
    let app = routes::router(Arc::new(aggregator(
        &Script::failing(Failure::Status(500)),
        &Script::ok(coach(Uuid::new_v4())),
    )));

    let (status, json) = get(app, &format!("/v1/session-details/{}", Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_health() {
    let app = routes::router(Arc::new(aggregator(
        &Script::ok(session(Uuid::new_v4(), Uuid::new_v4())),
        &Script::ok(coach(Uuid::new_v4())),
    )));

    let (status, json) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}
