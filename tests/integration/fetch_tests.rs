//! Integration tests for the HTTP fetcher
//!
//! These tests use wiremock to create mock HTTP servers and check the
//! retry, backoff and rate-limit behavior against real responses.

use std::time::{Duration, Instant};
use trawl::crawler::{
    FetchFailure, FetchOutcome, FetchSettings, HttpFetcher, PageFetcher, ProxyConfig, ProxyPolicy,
    RetryPolicy,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_retries: u32, retry_delay_ms: u64) -> FetchSettings {
    FetchSettings {
        user_agent: "TestBot/1.0".to_string(),
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryPolicy::new(max_retries, Duration::from_millis(retry_delay_ms)),
    }
}

fn direct_fetcher(max_retries: u32, retry_delay_ms: u64) -> HttpFetcher {
    HttpFetcher::new(settings(max_retries, retry_delay_ms), ProxyConfig::direct())
}

/// Returns an address nothing is listening on
fn closed_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let address = listener.local_addr().expect("No local address");
    drop(listener);
    address.to_string()
}

#[tokio::test]
async fn test_fetch_success_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Test</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(3, 10);
    assert!(!fetcher.is_open());

    let outcome = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;

    assert_eq!(outcome, FetchOutcome::Content("<html>Test</html>".to_string()));
    assert!(fetcher.is_open());
}

#[tokio::test]
async fn test_rate_limit_honors_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Success</html>"))
        .mount(&mock_server)
        .await;

    // Backoff delay is far shorter than Retry-After, so only the header explains the wait
    let fetcher = direct_fetcher(3, 10);
    let started = Instant::now();
    let outcome = fetcher.fetch(&format!("{}/limited", mock_server.uri())).await;

    assert_eq!(outcome, FetchOutcome::Content("<html>Success</html>".to_string()));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rate_limit_without_retry_after_uses_backoff_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(3, 200);
    let started = Instant::now();
    let outcome = fetcher.fetch(&format!("{}/limited", mock_server.uri())).await;

    assert!(outcome.is_content());
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_server_errors_exhaust_retry_budget() {
    let mock_server = MockServer::start().await;

    // Initial attempt plus three retries
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(3, 10);
    let outcome = fetcher.fetch(&format!("{}/broken", mock_server.uri())).await;

    match outcome {
        FetchOutcome::Failure(FetchFailure::Exhausted { attempts, .. }) => assert_eq!(attempts, 4),
        other => panic!("Expected exhausted failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_backoff_grows_between_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    // Waits of at least 100ms then 200ms
    let fetcher = direct_fetcher(2, 100);
    let started = Instant::now();
    let outcome = fetcher.fetch(&format!("{}/broken", mock_server.uri())).await;

    assert!(!outcome.is_content());
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_recovers_after_transient_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Success</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(3, 10);
    let outcome = fetcher.fetch(&format!("{}/flaky", mock_server.uri())).await;

    assert_eq!(outcome, FetchOutcome::Content("<html>Success</html>".to_string()));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(3, 10);
    let outcome = fetcher.fetch(&format!("{}/missing", mock_server.uri())).await;

    assert_eq!(
        outcome,
        FetchOutcome::Failure(FetchFailure::NonRetryable { status: 404 })
    );
}

#[tokio::test]
async fn test_rate_limit_exhaustion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(1, 10);
    let outcome = fetcher.fetch(&format!("{}/limited", mock_server.uri())).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failure(FetchFailure::Exhausted { attempts: 2, .. })
    ));
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut settings = settings(1, 10);
    settings.request_timeout = Duration::from_secs(1);
    let fetcher = HttpFetcher::new(settings, ProxyConfig::direct());

    let outcome = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failure(FetchFailure::Exhausted { attempts: 2, .. })
    ));
}

#[tokio::test]
async fn test_connection_refused_degrades() {
    let fetcher = direct_fetcher(1, 10);
    let outcome = fetcher
        .fetch(&format!("http://{}/page", closed_address()))
        .await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failure(FetchFailure::Exhausted { attempts: 2, .. })
    ));
}

#[tokio::test]
async fn test_dead_fixed_proxy_degrades() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let proxies = ProxyConfig::new(vec![closed_address()], ProxyPolicy::Fixed);
    let fetcher = HttpFetcher::new(settings(0, 10), proxies);

    let outcome = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;

    assert!(!outcome.is_content());
}

#[tokio::test]
async fn test_rotate_tries_every_dead_proxy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let proxies = ProxyConfig::new(
        vec![closed_address(), closed_address(), closed_address()],
        ProxyPolicy::Rotate,
    );
    assert_eq!(proxies.routes().len(), 3);

    // Two attempts per route, three routes
    let fetcher = HttpFetcher::new(settings(1, 10), proxies);
    let outcome = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failure(FetchFailure::Exhausted { attempts: 6, .. })
    ));
}

/// Mounts a forward proxy answering every request with `body`
async fn start_proxy(body: &str) -> MockServer {
    let proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&proxy)
        .await;

    proxy
}

#[tokio::test]
async fn test_fixed_proxy_serves_content() {
    let proxy = start_proxy("via proxy").await;

    let proxies = ProxyConfig::new(vec![proxy.address().to_string()], ProxyPolicy::Fixed);
    let fetcher = HttpFetcher::new(settings(0, 10), proxies);

    // The target host does not resolve, so only the proxy can answer
    let outcome = fetcher.fetch("http://example.invalid/page").await;

    assert_eq!(outcome, FetchOutcome::Content("via proxy".to_string()));
    assert_eq!(proxy.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rotate_fails_over_to_live_proxy() {
    let proxy = start_proxy("via proxy").await;
    let dead = closed_address();
    let pool = vec![dead.clone(), proxy.address().to_string()];

    // The starting endpoint is random; keep drawing until the dead one leads
    let proxies = loop {
        let proxies = ProxyConfig::new(pool.clone(), ProxyPolicy::Rotate);
        if proxies.routes()[0] == Some(format!("http://{}", dead)) {
            break proxies;
        }
    };
    assert_eq!(proxies.routes().len(), 2);

    let fetcher = HttpFetcher::new(settings(0, 10), proxies);
    let outcome = fetcher.fetch("http://example.invalid/page").await;

    assert_eq!(outcome, FetchOutcome::Content("via proxy".to_string()));
    assert_eq!(proxy.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_session_shared_across_concurrent_fetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_millis(50)),
        )
        .expect(5)
        .mount(&mock_server)
        .await;

    let fetcher = std::sync::Arc::new(direct_fetcher(0, 10));
    let mut handles = Vec::new();
    for i in 0..5 {
        let fetcher = std::sync::Arc::clone(&fetcher);
        let url = format!("{}/page/{}", mock_server.uri(), i);
        handles.push(tokio::spawn(async move { fetcher.fetch(&url).await }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_content());
    }
    assert!(fetcher.is_open());
}
