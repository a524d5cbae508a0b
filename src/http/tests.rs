//! Tests for the HTTP transport module

use super::transport::wire_request;
use super::*;
use crate::config::{Cookie, SessionConfig};
use crate::error::Error;
use crate::request::RequestOptions;
use crate::session::Session;
use crate::types::{Body, DelayRange, Method, ParameterMap, StringMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session() -> Arc<Session> {
    Session::new(SessionConfig::default()).unwrap()
}

fn url(server: &MockServer, p: &str) -> crate::error::Result<Url> {
    Ok(Url::parse(&format!("{}{}", server.uri(), p)).unwrap())
}

fn test_url() -> Url {
    Url::parse("https://api.example.com/v1/feed/").unwrap()
}

// ============================================================================
// Wire Request Tests
// ============================================================================

#[test]
fn test_wire_request_get_without_body() {
    let client = reqwest::Client::new();
    let request = wire_request(
        &client,
        SessionConfig::default().default_headers(),
        &StringMap::new(),
        None,
        Method::GET,
        test_url(),
        None,
        &StringMap::new(),
    )
    .unwrap();

    assert_eq!(request.method(), reqwest::Method::GET);
    assert!(request.body().is_none());
    assert_eq!(request.headers()["accept-language"], "en_US");
    assert_eq!(request.headers()["x-connection-type"], "WIFI");
    assert!(request.headers().get("cookie").is_none());
}

#[test]
fn test_wire_request_empty_parameters_have_no_body() {
    let client = reqwest::Client::new();
    let body = Body::Parameters(ParameterMap::new());
    let request = wire_request(
        &client,
        Vec::new(),
        &StringMap::new(),
        None,
        Method::GET,
        test_url(),
        Some(&body),
        &StringMap::new(),
    )
    .unwrap();

    assert!(request.body().is_none());
}

#[test]
fn test_wire_request_parameters_force_post() {
    let client = reqwest::Client::new();
    let body = Body::parameters([("b", "2"), ("a", "1")]);
    let request = wire_request(
        &client,
        Vec::new(),
        &StringMap::new(),
        None,
        Method::GET,
        test_url(),
        Some(&body),
        &StringMap::new(),
    )
    .unwrap();

    assert_eq!(request.method(), reqwest::Method::POST);
    let sent = request.body().and_then(reqwest::Body::as_bytes).unwrap();
    assert_eq!(sent, b"a=1&b=2");
}

#[test]
fn test_wire_request_raw_body_unchanged() {
    let client = reqwest::Client::new();
    let body = Body::data(&b"{\"raw\":true}"[..]);
    let request = wire_request(
        &client,
        Vec::new(),
        &StringMap::new(),
        None,
        Method::POST,
        test_url(),
        Some(&body),
        &StringMap::new(),
    )
    .unwrap();

    let sent = request.body().and_then(reqwest::Body::as_bytes).unwrap();
    assert_eq!(sent, b"{\"raw\":true}");
}

#[test]
fn test_wire_request_header_layers() {
    let client = reqwest::Client::new();
    let mut overrides = StringMap::new();
    overrides.insert("User-Agent".to_string(), "session-agent".to_string());
    overrides.insert("X-Session".to_string(), "s".to_string());
    let mut per_call = StringMap::new();
    per_call.insert("X-Session".to_string(), "call".to_string());

    let request = wire_request(
        &client,
        SessionConfig::default().default_headers(),
        &overrides,
        Some("sessionid=abc"),
        Method::GET,
        test_url(),
        None,
        &per_call,
    )
    .unwrap();

    assert_eq!(request.headers()["user-agent"], "session-agent");
    assert_eq!(request.headers()["x-session"], "call");
    assert_eq!(request.headers()["cookie"], "sessionid=abc");
}

#[test]
fn test_wire_request_rejects_bad_header() {
    let client = reqwest::Client::new();
    let mut per_call = StringMap::new();
    per_call.insert("Bad Header".to_string(), "x".to_string());

    let result = wire_request(
        &client,
        Vec::new(),
        &StringMap::new(),
        None,
        Method::GET,
        test_url(),
        None,
        &per_call,
    );
    assert!(matches!(result, Err(Error::Config { .. })));
}

// ============================================================================
// Fetch Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_returns_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/feed"))
        .and(header("accept-language", "en_US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let session = session();
    let transport = Transport::new(&session);
    let response = transport
        .fetch(
            Method::GET,
            url(&mock_server, "/api/feed"),
            None,
            StringMap::new(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap().as_ref(), br#"{"ok":true}"#);
}

#[tokio::test]
async fn test_fetch_empty_body_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let session = session();
    let response = Transport::new(&session)
        .fetch(Method::GET, url(&mock_server, "/x"), None, StringMap::new(), None)
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_none());
}

#[tokio::test]
async fn test_fetch_non_200_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let session = session();
    let response = Transport::new(&session)
        .fetch(Method::GET, url(&mock_server, "/x"), None, StringMap::new(), None)
        .await
        .unwrap();
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_fetch_posts_form_body_and_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/like"))
        .and(body_string("media_id=42&module=feed"))
        .and(header("cookie", "csrftoken=t"))
        .and(header("x-call", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session();
    session.set_cookies(vec![Cookie::new("csrftoken", "t")]).await;
    let mut headers = StringMap::new();
    headers.insert("X-Call".to_string(), "1".to_string());

    let response = Transport::new(&session)
        .fetch(
            Method::GET,
            url(&mock_server, "/api/like"),
            Some(Body::parameters([("media_id", "42"), ("module", "feed")])),
            headers,
            None,
        )
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_fetch_invalid_url_schedules_nothing() {
    let session = session();
    let result = Transport::new(&session)
        .fetch(
            Method::GET,
            Err(Error::InvalidUrl),
            None,
            StringMap::new(),
            None,
        )
        .await;
    assert!(matches!(result, Err(Error::InvalidUrl)));
}

#[tokio::test]
async fn test_fetch_released_session_makes_no_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = session();
    let transport = Transport::new(&session);
    drop(session);

    let result = transport
        .fetch(Method::GET, url(&mock_server, "/x"), None, StringMap::new(), None)
        .await;
    assert!(matches!(result, Err(Error::ReleasedSession)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_released_during_pacing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let session = session();
    let transport = Transport::new(&session);
    let target = url(&mock_server, "/x");
    let handle = tokio::spawn(async move {
        transport
            .fetch(
                Method::GET,
                target,
                None,
                StringMap::new(),
                Some(DelayRange::new(0.3, 0.3)),
            )
            .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(session);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(Error::ReleasedSession)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_released_while_in_flight() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let session = session();
    let transport = Transport::new(&session);
    let target = url(&mock_server, "/slow");
    let handle = tokio::spawn(async move {
        transport
            .fetch(Method::GET, target, None, StringMap::new(), None)
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(session);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(Error::ReleasedSession)));
}

#[tokio::test]
async fn test_fetch_rejects_unusable_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = session();
    for delay in [DelayRange::new(0.0, f64::INFINITY), DelayRange::new(1e20, 1e20)] {
        let result = Transport::new(&session)
            .fetch(
                Method::GET,
                url(&mock_server, "/x"),
                None,
                StringMap::new(),
                Some(delay),
            )
            .await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}

#[tokio::test]
async fn test_fetch_applies_pacing_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let config = SessionConfig::builder()
        .delay(DelayRange::new(0.2, 0.2))
        .build();
    let session = Session::new(config).unwrap();

    let started = Instant::now();
    Transport::new(&session)
        .fetch(Method::GET, url(&mock_server, "/x"), None, StringMap::new(), None)
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_fetch_with_runs_continuation_on_working_lane() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let session = session();
    let status = Transport::new(&session)
        .fetch_with(
            Method::GET,
            url(&mock_server, "/x"),
            None,
            StringMap::new(),
            RequestOptions::HAND_OFF_TO_WORKING_LANE,
            None,
            |response| Ok(response.status),
        )
        .await
        .unwrap();
    assert_eq!(status, 201);
}
