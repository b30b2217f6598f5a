//! Integration tests for `PageClient::fetch_page`.
//!
//! Each test stands up a local `wiremock` server so no real network traffic
//! is made. The catalog reports unknown product ids with 404 or 500, which the
//! client must surface as a missing page rather than an error.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pmdb_scraper::{extract_product_from_html, PageClient, ScraperError};

/// 5-second timeout, descriptive UA, no retries.
fn test_client() -> PageClient {
    PageClient::new(5, "pmdb-test/0.1", 0, 0).expect("failed to build test PageClient")
}

fn test_client_with_retries(max_retries: u32) -> PageClient {
    PageClient::new(5, "pmdb-test/0.1", max_retries, 0).expect("failed to build test PageClient")
}

const PRODUCT_PAGE: &str = r#"<html><head>
    <title>Coin Bite by Mark Jones - Penguin Magic Shop</title>
    <meta property="product:price:amount" content="15.00">
    </head><body></body></html>"#;

#[tokio::test]
async fn fetch_page_returns_body_on_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/1452"))
        .and(header("user-agent", "pmdb-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/p/1452", server.uri());
    let body = test_client().fetch_page(&url).await.unwrap();

    assert_eq!(body.as_deref(), Some(PRODUCT_PAGE));

    let record = extract_product_from_html(&body.unwrap(), &url)
        .unwrap()
        .record;
    assert_eq!(record.name, "Coin Bite by Mark Jones");
    assert_eq!(record.author.as_deref(), Some("Mark Jones"));
}

#[tokio::test]
async fn fetch_page_returns_none_on_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/99999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client()
        .fetch_page(&format!("{}/p/99999", server.uri()))
        .await;

    assert!(
        matches!(result, Ok(None)),
        "expected Ok(None), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_returns_none_on_500_without_retrying() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/7"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client_with_retries(3)
        .fetch_page(&format!("{}/p/7", server.uri()))
        .await;

    assert!(
        matches!(result, Ok(None)),
        "expected Ok(None), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_retries_after_429() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/3"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .with_priority(2)
        .mount(&server)
        .await;

    let result = test_client_with_retries(2)
        .fetch_page(&format!("{}/p/3", server.uri()))
        .await;

    assert_eq!(result.unwrap().as_deref(), Some(PRODUCT_PAGE));
}

#[tokio::test]
async fn fetch_page_reports_rate_limit_when_retries_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/3"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let result = test_client_with_retries(1)
        .fetch_page(&format!("{}/p/3", server.uri()))
        .await;

    assert!(
        matches!(
            result,
            Err(ScraperError::RateLimited {
                retry_after_secs: 0,
                ..
            })
        ),
        "expected RateLimited, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_retries_503_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/5"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .with_priority(2)
        .mount(&server)
        .await;

    let result = test_client_with_retries(1)
        .fetch_page(&format!("{}/p/5", server.uri()))
        .await;

    assert!(
        matches!(result, Ok(Some(_))),
        "expected Ok(Some(_)), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_returns_unexpected_status_on_403() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/8"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client_with_retries(3)
        .fetch_page(&format!("{}/p/8", server.uri()))
        .await;

    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 403, .. })),
        "expected UnexpectedStatus(403), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_rejects_relative_url_without_request() {
    let result = test_client().fetch_page("/p/1").await;

    assert!(
        matches!(result, Err(ScraperError::InvalidUrl { .. })),
        "expected InvalidUrl, got: {result:?}"
    );
}
