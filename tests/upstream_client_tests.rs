//! Wiremock integration tests for BilibiliClient.
//!
//! These tests verify the HTTP interaction and error mapping of the metadata
//! client, and the resolver's handling of a misbehaving API.

use std::sync::Arc;
use std::time::Duration;

use bili_redirect::resolver::{BilibiliClient, CollectionSource, LinkResolver, PageInfo};
use bili_redirect::RedirectError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIEW_PATH: &str = "/x/web-interface/view";

fn client(server: &MockServer) -> BilibiliClient {
    BilibiliClient::with_base_url(server.uri(), Duration::from_secs(2)).unwrap()
}

fn view_body() -> serde_json::Value {
    serde_json::json!({
        "code": 0,
        "message": "0",
        "ttl": 1,
        "data": {
            "bvid": "BV1xx411c7mD",
            "title": "Series",
            "pages": [
                {"cid": 101, "page": 1, "part": "Intro", "duration": 60},
                {"cid": 102, "page": 2, "part": "Finale", "duration": 90}
            ]
        }
    })
}

/// Test successful part list request.
#[tokio::test]
async fn test_fetch_collection_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .and(query_param("bvid", "BV1xx411c7mD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(view_body()))
        .mount(&server)
        .await;

    let pages = client(&server)
        .fetch_collection("BV1xx411c7mD")
        .await
        .expect("fetch should succeed");

    assert_eq!(
        pages,
        vec![PageInfo::new(101, 1, "Intro"), PageInfo::new(102, 2, "Finale")]
    );
}

/// Test non-2xx status maps to an upstream error.
#[tokio::test]
async fn test_fetch_collection_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client(&server).fetch_collection("BV1xx411c7mD").await;
    assert!(matches!(result, Err(RedirectError::Upstream(_))));
}

/// Test API-level error code maps to an upstream error.
#[tokio::test]
async fn test_fetch_collection_api_error_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": -404,
            "message": "啥都木有",
            "data": null
        })))
        .mount(&server)
        .await;

    let result = client(&server).fetch_collection("BV1nope").await;
    assert!(matches!(result, Err(RedirectError::Upstream(_))));
}

/// Test malformed JSON maps to an upstream error.
#[tokio::test]
async fn test_fetch_collection_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let result = client(&server).fetch_collection("BV1xx411c7mD").await;
    assert!(matches!(result, Err(RedirectError::Upstream(_))));
}

/// Test a slow API is cut off by the client timeout.
#[tokio::test]
async fn test_fetch_collection_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(view_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = BilibiliClient::with_base_url(server.uri(), Duration::from_millis(200)).unwrap();
    let result = client.fetch_collection("BV1xx411c7mD").await;
    assert!(matches!(result, Err(RedirectError::Upstream(_))));
}

/// Test the resolver serves every part of a video from one API call.
#[tokio::test]
async fn test_resolver_calls_api_once_per_video() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .and(query_param("bvid", "BV1xx411c7mD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(view_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = LinkResolver::new(
        50,
        Duration::from_secs(60),
        "https://www.bilibili.com/video/",
        Arc::new(client(&server)),
    )
    .unwrap();

    let first = resolver.resolve("BV1xx411c7mD", 101).await.unwrap();
    let second = resolver.resolve("BV1xx411c7mD", 102).await.unwrap();
    assert!(resolver.resolve("BV1xx411c7mD", 103).await.is_none());

    assert_eq!(&*first.url, "https://www.bilibili.com/video/BV1xx411c7mD?p=1");
    assert_eq!(&*second.title, "Finale");
}

/// Test a failing API is asked once and the failure is served from cache.
#[tokio::test]
async fn test_resolver_memoizes_api_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VIEW_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = LinkResolver::new(
        50,
        Duration::from_secs(60),
        "https://www.bilibili.com/video/",
        Arc::new(client(&server)),
    )
    .unwrap();

    assert!(resolver.resolve("BV1broken", 1).await.is_none());
    assert!(resolver.resolve("BV1broken", 2).await.is_none());
    assert!(resolver.resolve("BV1broken", 1).await.is_none());
}
