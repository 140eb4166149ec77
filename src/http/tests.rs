//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Hang up without answering
const DROP: &[u8] = b"";

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 11\r\nconnection: close\r\n\r\n{\"ok\":true}";

fn fast_backoff(max_retries: u32) -> BackoffConfig {
    BackoffConfig {
        requests_per_minute: 60_000,
        max_retries,
        backoff_type: BackoffType::Exponential,
        rate_limit_base: Duration::from_millis(20),
        server_error_base: Duration::from_millis(10),
        max_delay: Duration::from_millis(200),
    }
}

fn client_at(base_url: impl Into<String>, max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(base_url)
        .backoff(fast_backoff(max_retries))
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

fn client_for(server: &MockServer, max_retries: u32) -> HttpClient {
    client_at(server.uri(), max_retries)
}

async fn get(client: &HttpClient, url: &str) -> crate::error::Result<String> {
    client.get_with_config(url, RequestConfig::new()).await
}

/// Accepts one connection per reply, reads the request, writes the reply
/// verbatim and hangs up. An empty reply drops the connection unanswered.
async fn scripted_server(replies: Vec<&'static [u8]>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for reply in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(reply).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.backoff.max_retries, 3);
    assert!(config.base_url.is_none());
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::per_minute(240)));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.fda.gov")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .requests_per_minute(40)
        .query("api_key", "secret")
        .build();

    assert_eq!(config.base_url, Some("https://api.fda.gov".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.backoff.max_retries, 5);
    assert_eq!(config.backoff.requests_per_minute, 40);
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::per_minute(40)));
    assert_eq!(
        config.default_query.get("api_key"),
        Some(&"secret".to_string())
    );
}

#[test]
fn test_http_client_config_debug_hides_values() {
    let config = HttpClientConfig::builder()
        .query("api_key", "super-secret")
        .build();
    let debug_str = format!("{config:?}");
    assert!(debug_str.contains("api_key"));
    assert!(!debug_str.contains("super-secret"));
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new().query("skip", "0").query("limit", "10");

    assert_eq!(config.query.get("skip"), Some(&"0".to_string()));
    assert_eq!(config.query.get("limit"), Some(&"10".to_string()));
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/food/enforcement.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"recall_number": "F-1"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let body = get(&client, "/food/enforcement.json").await.unwrap();
    let data: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(data["results"][0]["recall_number"], "F-1");
}

#[tokio::test]
async fn test_http_client_default_and_request_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/food/enforcement.json"))
        .and(query_param("api_key", "k123"))
        .and(query_param("skip", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .query("api_key", "k123")
        .no_rate_limit()
        .build();

    let client = HttpClient::with_config(config).unwrap();
    let body = client
        .get_with_config(
            "/food/enforcement.json",
            RequestConfig::new().query("skip", "1000"),
        )
        .await
        .unwrap();

    assert_eq!(body, "matched");
}

#[tokio::test]
async fn test_http_client_full_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("absolute"))
        .mount(&mock_server)
        .await;

    // Client without base URL
    let config = HttpClientConfig::builder().no_rate_limit().build();
    let client = HttpClient::with_config(config).unwrap();

    let body = get(&client, &format!("{}/api/test", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "absolute");
}

// ============================================================================
// Status Handling Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_client_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forbidden"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API_KEY_INVALID"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let err = get(&client, "/api/forbidden").await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "API_KEY_INVALID");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_client_retry_on_500() {
    let mock_server = MockServer::start().await;

    // First two calls return 500, third succeeds
    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let body = get(&client, "/api/flaky").await.unwrap();

    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_http_client_rate_limit_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limited"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let start = std::time::Instant::now();
    let body = get(&client, "/api/limited").await.unwrap();

    assert_eq!(body, "ok");
    // Waited at least the rate-limit base before retrying
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_http_client_rate_limit_honors_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 1);
    assert_eq!(get(&client, "/api/limited").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_http_client_rate_limit_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let err = get(&client, "/api/limited").await.unwrap_err();

    assert!(matches!(err, Error::RateLimited { retries: 2 }));
}

#[tokio::test]
async fn test_http_client_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/always-fail"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let err = get(&client, "/api/always-fail").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(err.is_retryable());
}

// ============================================================================
// Transport Failure Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_timeout_retried_then_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .backoff(fast_backoff(1))
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = get(&client, "/api/slow").await.unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));
}

#[tokio::test]
async fn test_http_client_connection_dropped_then_success() {
    let base = scripted_server(vec![DROP, OK_RESPONSE]).await;
    let client = client_at(base, 2);

    let body = get(&client, "/food/enforcement.json").await.unwrap();

    assert_eq!(body, "{\"ok\":true}");
}

#[tokio::test]
async fn test_http_client_truncated_body_then_success() {
    let truncated: &'static [u8] =
        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"results\":";
    let base = scripted_server(vec![truncated, OK_RESPONSE]).await;
    let client = client_at(base, 2);

    let body = get(&client, "/food/enforcement.json").await.unwrap();

    assert_eq!(body, "{\"ok\":true}");
}

#[tokio::test]
async fn test_http_client_connection_dropped_until_exhausted() {
    let base = scripted_server(vec![DROP, DROP]).await;
    let client = client_at(base, 1);

    let err = get(&client, "/food/enforcement.json").await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_http_client_connection_refused_is_retryable() {
    // Bind then drop to get a port nothing listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client_at(format!("http://{addr}"), 0);

    let err = get(&client, "/food/enforcement.json").await.unwrap_err();

    assert!(err.is_retryable());
}

// ============================================================================
// Spacing Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_success_spacing_applies_without_quota() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .backoff(BackoffConfig {
            requests_per_minute: 1200,
            ..fast_backoff(0)
        })
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let start = std::time::Instant::now();
    for _ in 0..3 {
        get(&client, "/api/data").await.unwrap();
    }
    // 50ms after each success, two waits
    assert!(start.elapsed() >= Duration::from_millis(90));
}

#[tokio::test]
async fn test_http_client_with_rate_limiter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .requests_per_minute(1200)
        .build();

    let client = HttpClient::with_config(config).unwrap();

    let start = std::time::Instant::now();
    for _ in 0..3 {
        get(&client, "/api/data").await.unwrap();
    }
    assert!(start.elapsed() >= Duration::from_millis(90));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(debug_str.contains("has_rate_limiter"));
}
