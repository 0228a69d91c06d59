//! Integration tests for the HTTP client.

use std::time::Duration;

use typeahead_core::CancellationToken;
use typeahead_net::http::{HttpClient, HttpClientBuilder};
use typeahead_net::NetworkError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_client_builder() {
    let client = HttpClientBuilder::new()
        .timeout(Duration::from_secs(60))
        .no_cookies()
        .max_redirects(5)
        .user_agent("typeahead-tests")
        .build()
        .expect("Failed to build client");

    assert_eq!(client.config().timeout, Some(Duration::from_secs(60)));
    assert!(!client.config().cookies_enabled);
    assert_eq!(client.config().max_redirects, 5);
    assert_eq!(client.config().user_agent.as_deref(), Some("typeahead-tests"));
}

#[tokio::test]
async fn test_request_builder_chain() {
    let client = HttpClient::new();

    let request = client
        .get("/alunos/autocomplete/?q=jo")
        .header("X-Requested-With", "fetch")
        .header("bad header name", "dropped")
        .timeout(Duration::from_secs(5))
        .build();

    assert_eq!(request.url, "/alunos/autocomplete/?q=jo");
    assert_eq!(request.headers.len(), 1);
    assert_eq!(request.headers["x-requested-with"], "fetch");
    assert_eq!(request.timeout, Some(Duration::from_secs(5)));
}

#[tokio::test]
async fn test_get_json_with_marker_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alunos/autocomplete/"))
        .and(query_param("q", "jo"))
        .and(header("X-Requested-With", "fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"id": 1, "text": "Joana"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::builder()
        .base_url(url::Url::parse(&server.uri()).unwrap())
        .build()
        .unwrap();

    let response = client
        .get("/alunos/autocomplete/?q=jo")
        .header("X-Requested-With", "fetch")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["results"][0]["text"], "Joana");
}

#[tokio::test]
async fn test_default_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("X-Requested-With", "fetch"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::builder()
        .default_header("X-Requested-With", "fetch")
        .unwrap()
        .build()
        .unwrap();

    let response = client.get(format!("{}/any", server.uri())).send().await.unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = HttpClient::new();
    let response = client.get(server.uri()).send().await.unwrap();

    assert!(!response.is_success());
    assert_eq!(
        response.error_for_status().unwrap_err(),
        NetworkError::HttpStatus {
            status: 500,
            message: None
        }
    );
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = HttpClient::new();
    let response = client.get(server.uri()).send().await.unwrap();
    let result: Result<serde_json::Value, _> = response.json().await;

    assert!(matches!(result, Err(NetworkError::Json(_))));
}

#[tokio::test]
async fn test_relative_url_without_base() {
    let client = HttpClient::new();
    let result = client.get("/alunos/").send().await;
    assert!(matches!(result, Err(NetworkError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_cancel_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = HttpClient::new();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let result = client.get(server.uri()).send_cancellable(&token).await;

    assert_eq!(result.unwrap_err(), NetworkError::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_already_cancelled_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let result = HttpClient::new()
        .get(server.uri())
        .send_cancellable(&token)
        .await;
    assert!(result.unwrap_err().is_cancelled());
}
