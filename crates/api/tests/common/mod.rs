#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use executor_queue_api::{queue_routes, QueueHandler};
use executor_queue_testing_utils::{
    MockExecutorStore, MockJobTokenStore, MockRecordTransformer, MockWorkerStore, TestRecord,
};
use tower::ServiceExt;

pub const QUEUE: &str = "test";

/// Mocked collaborators behind a single `test` queue handler.
pub struct TestHarness {
    pub worker_store: MockWorkerStore<TestRecord>,
    pub transformer: MockRecordTransformer,
    pub job_tokens: MockJobTokenStore,
    pub executors: MockExecutorStore,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            worker_store: MockWorkerStore::new(),
            transformer: MockRecordTransformer::new(),
            job_tokens: MockJobTokenStore::new(),
            executors: MockExecutorStore::new(),
        }
    }

    pub fn handler(&self) -> Arc<QueueHandler<TestRecord>> {
        Arc::new(QueueHandler::new(
            QUEUE,
            Arc::new(self.worker_store.clone()),
            Arc::new(self.transformer.clone()),
            Arc::new(self.job_tokens.clone()),
        ))
    }

    pub fn router(&self) -> Router {
        queue_routes(self.handler())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: &str,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn post(router: Router, uri: &str, body: &str) -> TestResponse {
    send(router, Method::POST, uri, None, body).await
}
