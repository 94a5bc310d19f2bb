use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use strata_http::{
    AbortSignal, ApiConfig, HttpClient, HttpClientError, HttpClientOptions, HttpHeader,
    MaxRetryStrategy, Method, PassthroughStrategy, TimeoutStrategy,
};

#[derive(Clone)]
struct MockResponse {
    status: StatusCode,
    body: JsonValue,
    delay: Duration,
}

impl MockResponse {
    fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body,
            delay: Duration::from_millis(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    hits: Arc<AtomicUsize>,
}

async fn scripted_handler(State(state): State<MockState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "no mock response available"}),
            )
        })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (response.status, Json(response.body))
}

async fn echo_handler(
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: String,
) -> impl IntoResponse {
    let header_map: serde_json::Map<String, JsonValue> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_owned(), JsonValue::from(value)))
        })
        .collect();
    Json(json!({
        "headers": header_map,
        "query": query,
        "body": body,
    }))
}

struct TestServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn spawn_server(responses: Vec<MockResponse>) -> TestServer {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        hits: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/scripted", any(scripted_handler))
        .route("/echo", any(echo_handler))
        .route("/slow", get(slow_handler))
        .route("/created", post(created_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        hits: state.hits,
        task,
    }
}

async fn slow_handler() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(10)).await;
    Json(json!({"too": "late"}))
}

async fn created_handler(body: String) -> impl IntoResponse {
    (StatusCode::CREATED, body)
}

fn client_for(server: &TestServer, options: HttpClientOptions) -> HttpClient {
    HttpClient::with_reqwest(HttpClientOptions {
        base_url: Some(server.base_url.clone()),
        ..options
    })
}

#[tokio::test]
async fn get_decodes_json_body() {
    let server = spawn_server(vec![MockResponse::json(
        StatusCode::OK,
        json!({"id": 25, "name": "pikachu"}),
    )])
    .await;
    let client = client_for(&server, HttpClientOptions::default());

    let data: JsonValue = client
        .get("/scripted", ApiConfig::default(), None)
        .await
        .expect("request must succeed");

    assert_eq!(data["name"], "pikachu");
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn post_sends_json_body_and_returns_full_response() {
    let server = spawn_server(vec![]).await;
    let client = client_for(&server, HttpClientOptions::default());

    let config = ApiConfig::default().with_data(json!({"name": "bulbasaur"}));
    let response = client
        .request("/created", Method::Post, config, None)
        .await
        .expect("request must succeed");

    assert_eq!(response.status, 201);
    assert_eq!(response.status_text, "Created");
    assert!(response.text().contains("bulbasaur"));
}

#[tokio::test]
async fn non_2xx_surfaces_as_failed_with_the_response_payload() {
    let server = spawn_server(vec![MockResponse::json(
        StatusCode::NOT_FOUND,
        json!({"error": "missing"}),
    )])
    .await;
    let client = client_for(&server, HttpClientOptions::default());

    let err = client
        .request("/scripted", Method::Get, ApiConfig::default(), None)
        .await
        .expect_err("404 must fail");

    let response = err.failed_response().expect("failed response payload");
    assert_eq!(response.status, 404);
    assert!(response.text().contains("missing"));
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn max_retry_strategy_retries_until_success() {
    let server = spawn_server(vec![
        MockResponse::json(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})),
        MockResponse::json(StatusCode::OK, json!({"ok": true})),
    ])
    .await;
    let client = client_for(
        &server,
        HttpClientOptions {
            http_request_strategy: Some(Arc::new(MaxRetryStrategy::new(5))),
            ..HttpClientOptions::default()
        },
    );

    let data: JsonValue = client
        .get("/scripted", ApiConfig::default(), None)
        .await
        .expect("request must succeed after retry");

    assert_eq!(data["ok"], true);
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn status_429_stops_retrying_and_is_returned_as_a_response() {
    let server = spawn_server(vec![
        MockResponse::json(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})),
        MockResponse::json(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"})),
        MockResponse::json(StatusCode::OK, json!({"never": "reached"})),
    ])
    .await;
    let client = client_for(
        &server,
        HttpClientOptions {
            http_request_strategy: Some(Arc::new(MaxRetryStrategy::new(10))),
            ..HttpClientOptions::default()
        },
    );

    let response = client
        .request("/scripted", Method::Get, ApiConfig::default(), None)
        .await
        .expect("429 is a response, not an error");

    assert_eq!(response.status, 429);
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn timeout_strategy_rejects_slow_requests() {
    let server = spawn_server(vec![]).await;
    let client = client_for(
        &server,
        HttpClientOptions {
            http_request_strategy: Some(Arc::new(TimeoutStrategy::new(Duration::from_millis(
                100,
            )))),
            ..HttpClientOptions::default()
        },
    );

    let err = client
        .request("/slow", Method::Get, ApiConfig::default(), None)
        .await
        .expect_err("request must time out");

    assert!(matches!(err, HttpClientError::Timeout));
}

#[tokio::test]
async fn timeout_strategy_passes_fast_requests_through() {
    let server = spawn_server(vec![MockResponse::json(StatusCode::OK, json!({"ok": true}))]).await;
    let client = client_for(
        &server,
        HttpClientOptions {
            http_request_strategy: Some(Arc::new(TimeoutStrategy::new(Duration::from_secs(5)))),
            ..HttpClientOptions::default()
        },
    );

    let data: JsonValue = client
        .get("/scripted", ApiConfig::default(), None)
        .await
        .expect("fast request must succeed");
    assert_eq!(data["ok"], true);
}

#[tokio::test]
async fn aborting_mid_flight_yields_abort_error() {
    let server = spawn_server(vec![]).await;
    let client = client_for(&server, HttpClientOptions::default());

    let signal = AbortSignal::new();
    let trigger = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.abort();
    });

    let started = std::time::Instant::now();
    let err = client
        .request("/slow", Method::Get, ApiConfig::default(), Some(&signal))
        .await
        .expect_err("aborted request must fail");

    assert!(matches!(err, HttpClientError::Aborted));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn pre_aborted_signal_makes_no_network_call() {
    let server = spawn_server(vec![]).await;
    let client = client_for(&server, HttpClientOptions::default());

    let signal = AbortSignal::new();
    signal.abort();

    let err = client
        .request("/scripted", Method::Get, ApiConfig::default(), Some(&signal))
        .await
        .expect_err("aborted request must fail");

    assert!(matches!(err, HttpClientError::Aborted));
    assert_eq!(server.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn global_headers_are_merged_and_per_call_headers_win() {
    let server = spawn_server(vec![]).await;
    let client = client_for(&server, HttpClientOptions::default());
    client.add_global_api_headers(vec![
        HttpHeader::new("x-api-key", "global-key"),
        HttpHeader::new("x-trace", "global-trace"),
    ]);

    let config = ApiConfig::default()
        .with_headers([("x-trace".to_owned(), "per-call".to_owned())].into_iter().collect());
    let echo: JsonValue = client
        .get("/echo", config, None)
        .await
        .expect("request must succeed");

    assert_eq!(echo["headers"]["x-api-key"], "global-key");
    assert_eq!(echo["headers"]["x-trace"], "per-call");
}

#[tokio::test]
async fn no_global_bypasses_global_headers() {
    let server = spawn_server(vec![]).await;
    let client = client_for(&server, HttpClientOptions::default());
    client.add_global_api_header(HttpHeader::new("x-api-key", "global-key"));

    let echo: JsonValue = client
        .get("/echo", ApiConfig::default().isolated(), None)
        .await
        .expect("request must succeed");

    assert!(echo["headers"].get("x-api-key").is_none());
}

#[tokio::test]
async fn query_params_reach_the_server() {
    let server = spawn_server(vec![]).await;
    let client = client_for(&server, HttpClientOptions::default());

    let config = ApiConfig::default().with_params(json!({"limit": 20, "offset": 40}));
    let echo: JsonValue = client
        .get("/echo", config, None)
        .await
        .expect("request must succeed");

    let query = echo["query"].as_str().expect("query string must echo");
    assert!(query.contains("limit=20"));
    assert!(query.contains("offset=40"));
}

#[tokio::test]
async fn per_call_strategy_override_beats_the_client_default() {
    let server = spawn_server(vec![
        MockResponse::json(StatusCode::BAD_GATEWAY, json!({"error": "flaky"})),
        MockResponse::json(StatusCode::OK, json!({"ok": true})),
    ])
    .await;
    // Client default would fail on the first 502.
    let client = client_for(
        &server,
        HttpClientOptions {
            http_request_strategy: Some(Arc::new(PassthroughStrategy)),
            ..HttpClientOptions::default()
        },
    );

    let config = ApiConfig::default().with_strategy(Arc::new(MaxRetryStrategy::new(3)));
    let response = client
        .request("/scripted", Method::Get, config, None)
        .await
        .expect("override strategy must retry to success");

    assert_eq!(response.status, 200);
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);
}
