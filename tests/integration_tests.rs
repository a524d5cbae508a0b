//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: session config → paced requests →
//! decoded models and paginated aggregates

use pagekit::{
    load_session_config_from_str, ApiEndpoint, Bookmark, Document, Endpoint, Error,
    FromDocument, PageRequest, Paginated, RequestConfig, RequestOptions, Session,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_YAML: &str = r#"
timeout_seconds: 5
locale: de_DE
headers:
  X-App-Id: "1217981644879628"
cookies:
  - name: sessionid
    value: s3ss10n
  - name: csrftoken
    value: t0k3n
"#;

fn session() -> Arc<Session> {
    let config = load_session_config_from_str(SESSION_YAML).unwrap();
    Session::new(config).unwrap()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct User {
    pk: i64,
    username: String,
    is_verified: bool,
}

/// One page of a follower listing
struct FollowersPage {
    users: Vec<User>,
    next: Option<String>,
}

impl FromDocument for FollowersPage {
    fn from_document(document: Document) -> Option<Self> {
        let users = document
            .array("users")?
            .iter()
            .map(Document::decode)
            .collect::<Result<Vec<User>, _>>()
            .ok()?;
        Some(Self {
            users,
            next: document.string("next_max_id"),
        })
    }
}

impl Paginated for FollowersPage {
    fn next_cursor(&self) -> Option<String> {
        self.next.clone()
    }
}

fn user(pk: i64) -> serde_json::Value {
    json!({"pk": pk, "username": format!("user{pk}"), "is_verified": pk % 2 == 0})
}

async fn mount_followers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/friendships/42/followers/"))
        .and(query_param_is_missing("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user(1), user(2)],
            "next_max_id": "c1",
            "status": "ok"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/friendships/42/followers/"))
        .and(query_param("max_id", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user(3)],
            "next_max_id": "c2",
            "status": "ok"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/friendships/42/followers/"))
        .and(query_param("max_id", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user(4), user(5)],
            "status": "ok"
        })))
        .mount(server)
        .await;
}

fn followers(server: &MockServer, bookmark: Bookmark) -> PageRequest<FollowersPage, User> {
    PageRequest::for_endpoint(
        bookmark,
        ApiEndpoint::new(format!("{}/api/v1/friendships/42/followers/", server.uri()))
            .query("rank_token", "r1"),
        |page: &FollowersPage| page.users.clone(),
    )
}

// ============================================================================
// Request Pipeline Integration Tests
// ============================================================================

#[tokio::test]
async fn test_configured_session_sends_headers_and_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/info/"))
        .and(header("accept-language", "de_DE"))
        .and(header("x-app-id", "1217981644879628"))
        .and(header("cookie", "sessionid=s3ss10n; csrftoken=t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pk": 7,
            "username": "grace",
            "is_verified": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session();
    let endpoint = ApiEndpoint::new(format!("{}/api/v1/users/7/info/", mock_server.uri()));
    let user: User = session
        .requests()
        .decoded(&endpoint, RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(
        user,
        User {
            pk: 7,
            username: "grace".to_string(),
            is_verified: true
        }
    );
}

#[tokio::test]
async fn test_challenge_response_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/media/9/like/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "challenge_required",
            "status": "fail"
        })))
        .mount(&mock_server)
        .await;

    let session = session();
    let endpoint = ApiEndpoint::new(format!("{}/api/v1/media/9/like/", mock_server.uri()));
    let config = RequestConfig::new()
        .body(pagekit::Body::parameters([("media_id", "9")]))
        .options(RequestOptions::DEFAULT);

    let err = session
        .requests()
        .document(&endpoint, config.clone())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("challenge_required"));

    // without validation the same response is data
    let document = session
        .requests()
        .document(&endpoint, config.options(RequestOptions::NONE))
        .await
        .unwrap();
    assert_eq!(document.string("status").as_deref(), Some("fail"));
}

// ============================================================================
// Pagination Integration Tests
// ============================================================================

#[tokio::test]
async fn test_followers_pagination_flow() {
    let mock_server = MockServer::start().await;
    mount_followers(&mock_server).await;

    let session = session();
    let outcome = session
        .pagination()
        .paginate(followers(&mock_server, Bookmark::everything()))
        .await;

    let users = outcome.result.unwrap();
    assert_eq!(
        users.iter().map(|u| u.pk).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert!(users[1].is_verified);
    assert_eq!(outcome.bookmark.cursor.as_deref(), Some("c2"));
}

#[tokio::test]
async fn test_resume_from_persisted_bookmark() {
    let mock_server = MockServer::start().await;
    mount_followers(&mock_server).await;

    let session = session();
    let last_cursor = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&last_cursor);
    let request = followers(&mock_server, Bookmark::up_to(2)).on_page(move |update| {
        *sink.lock().unwrap() = update.page.next_cursor();
    });
    let first = session.pagination().paginate(request).await;

    assert_eq!(first.result.unwrap().len(), 3);
    assert_eq!(first.bookmark, Bookmark::from_cursor("c1", 1));

    // the bookmark survives a round trip through storage
    let saved = serde_json::to_string(&first.bookmark).unwrap();
    let restored: Bookmark = serde_json::from_str(&saved).unwrap();
    assert_eq!(restored, first.bookmark);

    let cursor = last_cursor.lock().unwrap().clone().unwrap();
    let rest = session
        .pagination()
        .paginate(followers(&mock_server, Bookmark::from_cursor(cursor, 10)))
        .await;
    assert_eq!(
        rest.result
            .unwrap()
            .iter()
            .map(|u| u.pk)
            .collect::<Vec<_>>(),
        vec![4, 5]
    );
}

#[tokio::test]
async fn test_single_page_as_model() {
    let mock_server = MockServer::start().await;
    mount_followers(&mock_server).await;

    let session = session();
    let page: FollowersPage = session
        .requests()
        .parsed(
            &ApiEndpoint::new(format!(
                "{}/api/v1/friendships/42/followers/",
                mock_server.uri()
            )),
            RequestConfig::new(),
        )
        .await
        .unwrap();

    assert_eq!(page.users.len(), 2);
    assert_eq!(page.next_cursor().as_deref(), Some("c1"));
}

#[tokio::test]
async fn test_endpoint_keeps_rank_token_across_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("rank_token", "r1"))
        .and(query_param("max_id", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session();
    let outcome = session
        .pagination()
        .paginate(followers(&mock_server, Bookmark::from_cursor("c1", 3)))
        .await;
    assert!(outcome.result.unwrap().is_empty());

    let endpoint = ApiEndpoint::new("https://api.example.com/feed/").rank("r2").next("c9");
    let url = endpoint.url().unwrap();
    assert_eq!(url.query(), Some("max_id=c9&rank_token=r2"));
}

#[tokio::test]
async fn test_dropped_session_cancels_pagination() {
    let mock_server = MockServer::start().await;
    mount_followers(&mock_server).await;

    let session = session();
    let pagination = session.pagination();
    drop(session);

    let outcome = pagination
        .paginate(followers(&mock_server, Bookmark::up_to(3)))
        .await;
    assert!(matches!(outcome.result, Err(Error::ReleasedSession)));
    assert_eq!(outcome.bookmark, Bookmark::up_to(3));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
