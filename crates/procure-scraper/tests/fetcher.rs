//! Integration tests for `Fetcher::fetch`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use procure_core::{SelectorSet, SourceConfig, DEFAULT_BROWSER_USER_AGENT};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use procure_scraper::{FetchError, Fetcher};

/// Builds a `Fetcher` suitable for tests: 5-second timeout, browser UA, no retries.
fn test_fetcher() -> Fetcher {
    Fetcher::new(5, DEFAULT_BROWSER_USER_AGENT, 0, 0).expect("failed to build test Fetcher")
}

fn source_for(server: &MockServer, template_path: &str) -> SourceConfig {
    SourceConfig {
        name: "Mock Store".to_owned(),
        base_url: server.uri(),
        search_url_template: format!("{}{template_path}", server.uri()),
        selectors: SelectorSet {
            container: ".product".to_owned(),
            title: "a".to_owned(),
            price: ".price".to_owned(),
            delivery: ".delivery".to_owned(),
        },
    }
}

#[tokio::test]
async fn fetch_returns_page_body_and_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/lumber"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let source = source_for(&server, "/s/{query}");
    let page = test_fetcher().fetch(&source, "lumber").await.unwrap();

    assert_eq!(page.source, "Mock Store");
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html>ok</html>");
    assert_eq!(page.url, format!("{}/s/lumber", server.uri()));
}

#[tokio::test]
async fn fetch_sends_browser_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/lumber"))
        .and(header("user-agent", DEFAULT_BROWSER_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, "/s/{query}");
    let result = test_fetcher().fetch(&source, "lumber").await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[tokio::test]
async fn fetch_encodes_query_into_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("searchTerm", "deck screws"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, "/search?searchTerm={query}");
    let page = test_fetcher().fetch(&source, "deck screws").await.unwrap();
    assert!(page.url.ends_with("searchTerm=deck%20screws"));
}

#[tokio::test]
async fn fetch_classifies_non_2xx_as_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/lumber"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let source = source_for(&server, "/s/{query}");
    let err = test_fetcher().fetch(&source, "lumber").await.unwrap_err();

    assert!(
        matches!(err, FetchError::Status { status: 403, .. }),
        "expected Status(403), got: {err:?}"
    );
    assert!(err.is_network());
}

#[tokio::test]
async fn fetch_classifies_connection_refused_as_network_error() {
    // Bind and drop a listener so the port is closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{port}");
    let source = SourceConfig {
        name: "Gone".to_owned(),
        base_url: uri.clone(),
        search_url_template: format!("{uri}/s/{{query}}"),
        selectors: SelectorSet {
            container: ".product".to_owned(),
            title: "a".to_owned(),
            price: ".price".to_owned(),
            delivery: ".delivery".to_owned(),
        },
    };

    let err = test_fetcher().fetch(&source, "lumber").await.unwrap_err();
    assert!(
        matches!(err, FetchError::Transport { .. }),
        "expected Transport, got: {err:?}"
    );
    assert!(err.is_network());
}

#[tokio::test]
async fn fetch_classifies_unusable_url_as_unexpected() {
    let source = SourceConfig {
        name: "Broken".to_owned(),
        base_url: "https://broken.example".to_owned(),
        search_url_template: "not a url/{query}".to_owned(),
        selectors: SelectorSet {
            container: ".product".to_owned(),
            title: "a".to_owned(),
            price: ".price".to_owned(),
            delivery: ".delivery".to_owned(),
        },
    };

    let err = test_fetcher().fetch(&source, "lumber").await.unwrap_err();
    assert!(
        matches!(err, FetchError::Unexpected { .. }),
        "expected Unexpected, got: {err:?}"
    );
    assert!(!err.is_network());
}

#[tokio::test]
async fn fetch_does_not_retry_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/lumber"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, "/s/{query}");
    let err = test_fetcher().fetch(&source, "lumber").await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn fetch_retries_after_503_when_enabled() {
    let server = MockServer::start().await;

    // First request returns 503 (served once).
    Mock::given(method("GET"))
        .and(path("/s/lumber"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s/lumber"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>second</html>"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(5, DEFAULT_BROWSER_USER_AGENT, 1, 0).unwrap();
    let source = source_for(&server, "/s/{query}");
    let page = fetcher.fetch(&source, "lumber").await.unwrap();
    assert_eq!(page.body, "<html>second</html>");
}
