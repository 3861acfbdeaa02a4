use ai_studio::config::SearchConfig;
use ai_studio::search::{SearchClient, SearchError, parse_response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const RESULTS_BODY: &str = r#"{
  "kind": "customsearch#search",
  "items": [
    {
      "title": "The Rust Programming Language",
      "link": "https://doc.rust-lang.org/book/",
      "displayLink": "doc.rust-lang.org",
      "snippet": "An introductory book about Rust."
    },
    {
      "title": "Tokio",
      "link": "https://tokio.rs/",
      "displayLink": "tokio.rs"
    }
  ]
}"#;

/// Serve one canned HTTP response and hand back the raw request line
async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = vec![0_u8; 4096];
        let n = socket.read(&mut buf).await.expect("read request");
        let request = String::from_utf8_lossy(&buf[..n]).to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        request.lines().next().unwrap_or_default().to_string()
    });
    (format!("http://{addr}/customsearch/v1"), handle)
}

#[test]
fn test_parse_results() {
    let results = parse_response(RESULTS_BODY).expect("valid body");
    assert_eq!(results.len(), 2);
    assert_eq!(results.items[0].display_link, "doc.rust-lang.org");
    assert_eq!(results.items[1].snippet, "");
    assert_eq!(results.notification().description, "Found 2 results");
}

#[test]
fn test_parse_no_items() {
    let results = parse_response(r#"{"kind":"customsearch#search"}"#).expect("valid body");
    assert!(results.is_empty());
}

#[test]
fn test_parse_api_error() {
    let err = parse_response(r#"{"error":{"code":403,"message":"API key not valid"}}"#)
        .expect_err("error body");
    assert!(matches!(&err, SearchError::Api(m) if m == "API key not valid"));
    assert_eq!(err.notification().title, "Search failed");
}

#[test]
fn test_parse_garbage() {
    assert!(matches!(
        parse_response("<html>nope</html>"),
        Err(SearchError::Decode(_))
    ));
}

#[tokio::test]
async fn test_blank_query_rejected_before_request() {
    // Port 9 is never contacted; the query check runs first
    let client = SearchClient::new("http://127.0.0.1:9/search", "key", "cx").expect("client");
    assert!(matches!(
        client.search("   ").await,
        Err(SearchError::EmptyQuery)
    ));
}

#[tokio::test]
async fn test_missing_key_rejected_before_request() {
    let config = SearchConfig {
        endpoint: "http://127.0.0.1:9/search".to_string(),
        ..Default::default()
    };
    let client = SearchClient::new(&config.endpoint, "", "cx").expect("client");
    assert!(matches!(
        client.search("rust").await,
        Err(SearchError::MissingApiKey)
    ));
}

#[tokio::test]
async fn test_search_against_local_server() {
    let (endpoint, server) = serve_once(RESULTS_BODY).await;
    let config = SearchConfig {
        endpoint,
        engine_id: "engine".to_string(),
        api_key: "secret".to_string(),
        timeout_seconds: 5,
    };
    let client = SearchClient::with_timeout(
        &config.endpoint,
        config.api_key.clone(),
        config.engine_id.clone(),
        std::time::Duration::from_secs(config.timeout_seconds),
    )
    .expect("client");

    let results = client.search("  rust book ").await.expect("search succeeds");
    assert_eq!(results.len(), 2);
    assert_eq!(results.items[1].title, "Tokio");

    let request_line = server.await.expect("server task");
    assert!(request_line.starts_with("GET /customsearch/v1?key=secret&cx=engine&q=rust+book "));
}
