//! Fetch wrapper against local mock servers
//!
//! Run: cargo test --test fetch_wrapper

use std::time::{Duration, Instant};

use futures::future::join_all;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nestkit::http::{
    AbortController, FetchClient, FetchError, FetchFailure, FetchOptions, HttpMethod, StatusClass,
};

fn quick_client() -> FetchClient {
    FetchClient::builder()
        .delay(Duration::ZERO)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

async fn fetch_err(server: &MockServer, route: &str) -> FetchError {
    let url = format!("{}{}", server.uri(), route);
    quick_client()
        .handle_fetch(&url, "tests", vec![json!("ctx")], FetchOptions::default())
        .await
        .unwrap_err()
}

// ── Responses ───────────────────────────────────────────────────────────

#[tokio::test]
async fn ok_response_resolves_with_body() {
    let server = serve("/users", ResponseTemplate::new(200).set_body_json(json!([{"id": 1}]))).await;
    let url = format!("{}/users", server.uri());

    let body = assert_ok!(quick_client().handle_fetch(&url, "users", vec![], FetchOptions::default()).await);
    assert_eq!(body, json!([{"id": 1}]));
}

#[tokio::test]
async fn not_found_is_classified() {
    let server = serve("/missing", ResponseTemplate::new(404)).await;
    let err = fetch_err(&server, "/missing").await;

    assert_eq!(err.status, 404);
    assert!(err.message.contains("404"));
    assert_eq!(err.status_class, StatusClass::ClientError);
    assert_eq!(err.kind, FetchFailure::Status);
    assert_eq!(err.origin, "tests");
    assert_eq!(err.vars, vec![json!("ctx")]);
    assert!(err.call.ends_with("/missing"));
    assert!(!err.ok);
}

#[tokio::test]
async fn rate_limited_and_bad_gateway_messages() {
    let server = serve("/busy", ResponseTemplate::new(429)).await;
    let err = fetch_err(&server, "/busy").await;
    assert_eq!(err.message, "There was an error: 429 Too Many Requests.");
    assert_eq!(err.kind, FetchFailure::Status);

    let server = serve("/gateway", ResponseTemplate::new(502)).await;
    let err = fetch_err(&server, "/gateway").await;
    assert_eq!(err.message, "There was an error: Network response 502.");
    assert_eq!(err.status_class, StatusClass::ServerError);

    let server = serve("/broken", ResponseTemplate::new(500)).await;
    let err = fetch_err(&server, "/broken").await;
    assert_eq!(err.message, "There was an error: Network response was not OK.");
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let server = serve(
        "/moved",
        ResponseTemplate::new(302).insert_header("Location", "/elsewhere"),
    )
    .await;
    let err = fetch_err(&server, "/moved").await;

    assert_eq!(err.status, 302);
    assert_eq!(err.status_class, StatusClass::Redirection);
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = serve("/garbled", ResponseTemplate::new(200).set_body_string("<html>")).await;
    let err = fetch_err(&server, "/garbled").await;

    assert_eq!(err.kind, FetchFailure::Decode);
    assert_eq!(err.status, 200);
    assert!(err.message.contains("not valid JSON"));
    assert!(err.detail.is_some());
}

// ── No response ─────────────────────────────────────────────────────────

#[tokio::test]
async fn timeout_reports_failed_to_fetch() {
    let server = serve(
        "/slow",
        ResponseTemplate::new(200)
            .set_body_json(json!({"late": true}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let url = format!("{}/slow", server.uri());
    let options = FetchOptions::default().with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = assert_err!(quick_client().handle_fetch(&url, "slow", vec![], options).await);

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(err.status, 429);
    assert!(err.message.contains("Failed to fetch"));
    assert_eq!(err.status_text, "TypeError: Failed to fetch");
    assert_eq!(err.status_class, StatusClass::NoResponse);
    assert!(err.is_timeout());
}

#[tokio::test]
async fn abort_cancels_in_flight_request() {
    let server = serve(
        "/hang",
        ResponseTemplate::new(200).set_body_json(json!({})).set_delay(Duration::from_secs(3)),
    )
    .await;
    let url = format!("{}/hang", server.uri());

    let controller = AbortController::new();
    let options = FetchOptions::default().with_abort_signal(controller.signal());
    let client = quick_client();
    let request = tokio::spawn(async move { client.handle_fetch(&url, "hang", vec![], options).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.abort();

    let err = request.await.unwrap().unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(err.status, 429);
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}/gone", port);

    let err = quick_client()
        .handle_fetch(&url, "gone", vec![], FetchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FetchFailure::Transport);
    assert_eq!(err.status, 429);
    assert!(err.detail.is_some());
}

// ── Options & variants ──────────────────────────────────────────────────

#[tokio::test]
async fn delay_is_applied_before_request() {
    let server = serve("/ping", ResponseTemplate::new(200).set_body_json(json!("pong"))).await;
    let url = format!("{}/ping", server.uri());
    let options = FetchOptions::default().with_delay(Duration::from_millis(150));

    let started = Instant::now();
    assert_ok!(quick_client().handle_fetch(&url, "ping", vec![], options).await);
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn per_call_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("X-Request-Source", "tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    let url = format!("{}/secure", server.uri());

    let options = FetchOptions::default().with_header("X-Request-Source", "tests");
    let body = assert_ok!(quick_client().handle_fetch(&url, "secure", vec![], options).await);
    assert_eq!(body, json!({"ok": true}));

    let err = fetch_err(&server, "/secure").await;
    assert_eq!(err.status, 404);
}

#[tokio::test]
async fn fetch_data_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(body_json(json!({"name": "lamp"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .mount(&server)
        .await;
    let url = format!("{}/items", server.uri());

    let method_name: HttpMethod = "POST".parse().unwrap();
    let created = assert_ok!(quick_client().fetch_data(&url, &json!({"name": "lamp"}), method_name).await);
    assert_eq!(created, json!({"id": 9}));
}

#[tokio::test]
async fn basic_fetch_decodes_json() {
    let server = serve("/plain", ResponseTemplate::new(200).set_body_json(json!({"v": 1}))).await;
    let url = format!("{}/plain", server.uri());

    assert_eq!(assert_ok!(quick_client().basic_fetch(&url).await), json!({"v": 1}));
    assert_eq!(assert_ok!(nestkit::http::basic_fetch(&url).await), json!({"v": 1}));
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("a")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = quick_client();
    let urls: Vec<String> = ["/a", "/b", "/a"].iter().map(|p| format!("{}{}", server.uri(), p)).collect();
    let results = join_all(
        urls.iter()
            .map(|url| client.handle_fetch(url, "batch", vec![], FetchOptions::default())),
    )
    .await;

    assert_eq!(results[0], Ok(json!("a")));
    assert_eq!(results[1].as_ref().map_err(|e| e.status), Err(404));
    assert_eq!(results[2], Ok(json!("a")));
}

#[tokio::test]
async fn shared_client_and_error_round_trip() {
    let server = serve("/gone", ResponseTemplate::new(404)).await;
    let url = format!("{}/gone", server.uri());

    let err = nestkit::http::handle_fetch(&url, "shared", vec![json!(1)], FetchOptions::default())
        .await
        .unwrap_err();
    let text = format!("Error: {}", err.to_json().unwrap());
    assert_eq!(FetchError::parse(&text).unwrap(), err);
}
