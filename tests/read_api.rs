use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use lambda_read_adapter::{
    api::{router, AppState},
    backend::{InvokeOutput, Invoker},
    proto::{Label, LabelMatcher, Query, ReadRequest, ReadResponse, Sample},
    AdapterError, Result,
};
use pretty_assertions::assert_eq;
use prost::Message;
use serde_json::Value;
use tower::ServiceExt;

/// Backend stand-in that replies with a fixed payload and records calls.
struct FakeBackend {
    status_code: i32,
    reply: &'static str,
    fail: bool,
    calls: Mutex<Vec<(String, String, Value)>>,
}

impl FakeBackend {
    fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status_code: 200,
            reply,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            status_code: 200,
            reply: "",
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Invoker for FakeBackend {
    async fn invoke(
        &self,
        region: &str,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvokeOutput> {
        self.calls.lock().unwrap().push((
            region.to_string(),
            function_name.to_string(),
            serde_json::from_slice(&payload).unwrap(),
        ));
        if self.fail {
            return Err(AdapterError::Invoke("function unreachable".into()));
        }
        Ok(InvokeOutput {
            status_code: self.status_code,
            function_error: None,
            payload: self.reply.as_bytes().to_vec(),
        })
    }
}

fn app(backend: Arc<FakeBackend>) -> Router {
    router(AppState::new("eu-west-1", backend))
}

fn query(matchers: Vec<LabelMatcher>, start: i64, end: i64) -> Query {
    Query {
        start_timestamp_ms: start,
        end_timestamp_ms: end,
        matchers,
        hints: None,
    }
}

fn scenario_query() -> Query {
    query(
        vec![
            LabelMatcher::new("__name__", "foo"),
            LabelMatcher::new("functionName", "f1"),
            LabelMatcher::new("target", "t1"),
            LabelMatcher::new("type", "count"),
        ],
        1000,
        5000,
    )
}

fn read_body(queries: Vec<Query>) -> Vec<u8> {
    let request = ReadRequest {
        queries,
        accepted_response_types: vec![],
    };
    snap::raw::Encoder::new()
        .compress_vec(&request.encode_to_vec())
        .unwrap()
}

async fn post_read(app: Router, body: Vec<u8>) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri("/read")
            .header(header::CONTENT_TYPE, "application/x-protobuf")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_read_end_to_end() {
    let backend = FakeBackend::replying(r#"[{"Target":"t1","Datapoints":[[7,1000],[9,4000]]}]"#);
    let response = post_read(app(backend.clone()), read_body(vec![scenario_query()])).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-protobuf"
    );
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "snappy");

    let raw = snap::raw::Decoder::new()
        .decompress_vec(&body_bytes(response).await)
        .unwrap();
    let decoded = ReadResponse::decode(raw.as_slice()).unwrap();

    assert_eq!(decoded.results.len(), 1);
    let timeseries = &decoded.results[0].timeseries;
    assert_eq!(timeseries.len(), 1);
    assert_eq!(
        timeseries[0].labels,
        vec![
            Label::new("__name__", "foo"),
            Label::new("functionName", "f1"),
            Label::new("target", "t1"),
            Label::new("type", "count"),
        ]
    );
    assert_eq!(
        timeseries[0].samples,
        vec![
            Sample {
                value: 7.0,
                timestamp: 1000
            },
            Sample {
                value: 9.0,
                timestamp: 4000
            },
        ]
    );

    let calls = backend.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "eu-west-1");
    assert_eq!(calls[0].1, "f1");
    assert_eq!(
        calls[0].2,
        serde_json::json!({
            "range": {"from": "1970-01-01T00:00:01Z", "to": "1970-01-01T00:00:05Z"},
            "targets": {"target": "t1", "type": "count"},
        })
    );
}

#[tokio::test]
async fn test_empty_backend_reply_yields_empty_result() {
    let backend = FakeBackend::replying("[]");
    let response = post_read(app(backend), read_body(vec![scenario_query()])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let raw = snap::raw::Decoder::new()
        .decompress_vec(&body_bytes(response).await)
        .unwrap();
    let decoded = ReadResponse::decode(raw.as_slice()).unwrap();
    assert_eq!(decoded.results.len(), 1);
    assert!(decoded.results[0].timeseries.is_empty());
}

#[tokio::test]
async fn test_null_series_fields_map_to_empty() {
    let backend = FakeBackend::replying(r#"[{"Target":null,"Datapoints":null}]"#);
    let response = post_read(app(backend), read_body(vec![scenario_query()])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let raw = snap::raw::Decoder::new()
        .decompress_vec(&body_bytes(response).await)
        .unwrap();
    let decoded = ReadResponse::decode(raw.as_slice()).unwrap();
    let timeseries = &decoded.results[0].timeseries;
    assert_eq!(timeseries.len(), 1);
    assert_eq!(timeseries[0].labels[2], Label::new("target", ""));
    assert!(timeseries[0].samples.is_empty());
}

#[tokio::test]
async fn test_requires_exactly_one_query() {
    for queries in [vec![], vec![scenario_query(), scenario_query()]] {
        let backend = FakeBackend::replying("[]");
        let response = post_read(app(backend.clone()), read_body(queries)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, b"Can only handle one query.");
        assert_eq!(backend.call_count(), 0);
    }
}

#[tokio::test]
async fn test_missing_function_name_skips_backend() {
    let backend = FakeBackend::replying("[]");
    let body = read_body(vec![query(
        vec![LabelMatcher::new("__name__", "foo")],
        0,
        1000,
    )]);
    let response = post_read(app(backend.clone()), body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_bytes(response).await, b"missing function name");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_corrupt_body_is_bad_request() {
    let backend = FakeBackend::replying("[]");
    let response = post_read(app(backend.clone()), b"definitely not snappy".to_vec()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_bad_request() {
    let backend = FakeBackend::failing();
    let response = post_read(app(backend.clone()), read_body(vec![scenario_query()])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_bytes(response).await, b"function unreachable");
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_malformed_backend_reply_is_bad_request() {
    let backend = FakeBackend::replying(r#"[{"Target":"t1","Datapoints":[[7]]}]"#);
    let response = post_read(app(backend), read_body(vec![scenario_query()])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let backend = FakeBackend::replying("[]");
    // Make sure at least one request has been counted.
    post_read(app(backend.clone()), read_body(vec![])).await;

    let response = app(backend)
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("remote_read_requests_total"));
    assert!(text.contains("remote_read_failures_total"));
}

#[tokio::test]
async fn test_read_rejects_get() {
    let backend = FakeBackend::replying("[]");
    let response = app(backend)
        .oneshot(Request::builder().uri("/read").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
