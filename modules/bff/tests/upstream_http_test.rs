//! HTTP upstream sources against a mock server
//!
//! Run with: cargo test --package bff-rs --test upstream_http_test

use bff_rs::config::Config;
use bff_rs::upstream::{
    HttpProfileSource, HttpSessionSource, ProfileSource, SessionSource, UpstreamClient,
    INTERNAL_SECRET_HEADER,
};
use bff_rs::build_aggregator;
use failure_policy::Failure;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "s3cret";

fn session_json(id: Uuid, coach_id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "coach_id": coach_id,
        "title": "Evening yoga",
        "description": "Slow flow",
        "start_at": "2026-03-02T18:00:00Z",
        "end_at": null,
        "capacity": 20,
        "created_at": "2026-02-21T09:30:00Z"
    })
}

fn session_source(server: &MockServer, timeout: Duration) -> HttpSessionSource {
    HttpSessionSource::new(
        UpstreamClient::new(server.uri(), Some(SECRET.to_string()), timeout).unwrap(),
    )
}

#[tokio::test]
async fn test_session_fetched_with_internal_secret() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let coach_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/v1/sessions/{}", id)))
        .and(header(INTERNAL_SECRET_HEADER, SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(id, coach_id)))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_source(&server, Duration::from_secs(5))
        .get_session(id)
        .await
        .unwrap();

    assert_eq!(session.id, id);
    assert_eq!(session.coach_id, coach_id);
    assert_eq!(session.title, "Evening yoga");
    assert!(session.end_at.is_none());
}

#[tokio::test]
async fn test_status_codes_map_to_failures() {
    for (status, expected) in [
        (404, Failure::NotFound),
        (500, Failure::Status(500)),
        (401, Failure::Status(401)),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = session_source(&server, Duration::from_secs(5))
            .get_session(Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err, expected);
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": 42"))
        .mount(&server)
        .await;

    let err = session_source(&server, Duration::from_secs(5))
        .get_session(Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, Failure::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_upstream_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = session_source(&server, Duration::from_millis(100))
        .get_session(Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err, Failure::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_unreachable_upstream_is_connection_failure() {
    // Nothing listens on port 9 (discard) in the test environment
    let client = UpstreamClient::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();

    let err = HttpProfileSource::new(client)
        .get_profile(Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, Failure::Connection(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_profile_decodes_with_missing_optionals() {
    let server = MockServer::start().await;
    let coach_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/v1/users/{}", coach_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": coach_id,
            "email": "coach@example.com"
        })))
        .mount(&server)
        .await;

    let client = UpstreamClient::new(server.uri(), None, Duration::from_secs(5)).unwrap();
    let profile = HttpProfileSource::new(client)
        .get_profile(coach_id)
        .await
        .unwrap();

    assert_eq!(profile.id, coach_id);
    assert!(profile.name.is_none());
    assert!(profile.avatar_url.is_none());
}

#[tokio::test]
async fn test_end_to_end_with_missing_coach() {
    let auth = MockServer::start().await;
    let users = MockServer::start().await;
    let id = Uuid::new_v4();
    let coach_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/v1/sessions/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(id, coach_id)))
        .mount(&auth)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/users/{}", coach_id)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&users)
        .await;

    let auth_uri = auth.uri();
    let users_uri = users.uri();
    let config = Config::from_lookup(|key| match key {
        "AUTH_SERVICE_URL" => Some(auth_uri.clone()),
        "USER_SERVICE_URL" => Some(users_uri.clone()),
        _ => None,
    })
    .unwrap();

    let view = build_aggregator(&config)
        .unwrap()
        .get_composite_view(&id.to_string())
        .await
        .unwrap();

    assert_eq!(view.id, id);
    assert_eq!(view.coach.id, coach_id);
    assert!(view.coach.name.is_none());
}
