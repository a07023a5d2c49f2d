mod common;

use axum::http::StatusCode;
use common::{post, TestHarness};
use executor_queue_core::{MarkFinalOptions, StoreError};
use serde_json::json;

const COMPLETE_BODY: &str = r#"{"executorName": "test-executor", "jobId": 42}"#;
const FAILURE_BODY: &str =
    r#"{"executorName": "test-executor", "jobId": 42, "errorMessage": "exit status 1"}"#;

fn owner() -> MarkFinalOptions {
    MarkFinalOptions::for_worker("test-executor")
}

#[tokio::test]
async fn test_mark_complete() {
    let harness = TestHarness::new();
    harness.worker_store.mark_complete.push_return(Ok(true));

    let response = post(harness.router(), "/test/markComplete", COMPLETE_BODY).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());
    assert_eq!(harness.worker_store.mark_complete.history(), vec![(42, owner())]);
    assert_eq!(harness.job_tokens.delete.history(), vec![(42, "test".to_string())]);
}

#[tokio::test]
async fn test_mark_complete_store_error() {
    let harness = TestHarness::new();
    harness
        .worker_store
        .mark_complete
        .push_return(Err(StoreError::other("failed")));

    let response = post(harness.router(), "/test/markComplete", COMPLETE_BODY).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({"error": "dbworkerstore.MarkComplete: failed"})
    );
    assert_eq!(harness.job_tokens.delete.call_count(), 0);
}

#[tokio::test]
async fn test_mark_complete_unknown_job() {
    let harness = TestHarness::new();
    harness.worker_store.mark_complete.push_return(Ok(false));

    let response = post(harness.router(), "/test/markComplete", COMPLETE_BODY).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "null");
    assert_eq!(harness.job_tokens.delete.call_count(), 0);
}

#[tokio::test]
async fn test_mark_complete_token_delete_error() {
    let harness = TestHarness::new();
    harness.worker_store.mark_complete.push_return(Ok(true));
    harness
        .job_tokens
        .delete
        .push_return(Err(StoreError::other("failed")));

    let response = post(harness.router(), "/test/markComplete", COMPLETE_BODY).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({"error": "jobTokenStore.Delete: failed"}));
    assert_eq!(harness.job_tokens.delete.call_count(), 1);
}

#[tokio::test]
async fn test_mark_errored() {
    let harness = TestHarness::new();
    harness.worker_store.mark_errored.push_return(Ok(true));

    let response = post(harness.router(), "/test/markErrored", FAILURE_BODY).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        harness.worker_store.mark_errored.history(),
        vec![(42, "exit status 1".to_string(), owner())]
    );
    assert_eq!(harness.job_tokens.delete.history(), vec![(42, "test".to_string())]);
}

#[tokio::test]
async fn test_mark_errored_failures() {
    let harness = TestHarness::new();
    harness
        .worker_store
        .mark_errored
        .push_return(Err(StoreError::other("failed")));
    let response = post(harness.router(), "/test/markErrored", FAILURE_BODY).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({"error": "dbworkerstore.MarkErrored: failed"}));

    let harness = TestHarness::new();
    let response = post(harness.router(), "/test/markErrored", FAILURE_BODY).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), serde_json::Value::Null);
    assert_eq!(harness.job_tokens.delete.call_count(), 0);
}

#[tokio::test]
async fn test_mark_failed() {
    let harness = TestHarness::new();
    harness.worker_store.mark_failed.push_return(Ok(true));

    let response = post(harness.router(), "/test/markFailed", FAILURE_BODY).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        harness.worker_store.mark_failed.history(),
        vec![(42, "exit status 1".to_string(), owner())]
    );
    assert_eq!(harness.job_tokens.delete.call_count(), 1);
}

#[tokio::test]
async fn test_mark_failed_token_delete_error() {
    let harness = TestHarness::new();
    harness.worker_store.mark_failed.push_return(Ok(true));
    harness
        .job_tokens
        .delete
        .push_return(Err(StoreError::other("failed")));

    let response = post(harness.router(), "/test/markFailed", FAILURE_BODY).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({"error": "jobTokenStore.Delete: failed"}));
}

#[tokio::test]
async fn test_finalizing_twice_is_not_an_error() {
    let harness = TestHarness::new();
    harness.worker_store.mark_complete.push_return(Ok(true));
    harness.worker_store.mark_complete.push_return(Ok(false));

    let first = post(harness.router(), "/test/markComplete", COMPLETE_BODY).await;
    let second = post(harness.router(), "/test/markComplete", COMPLETE_BODY).await;

    assert_eq!(first.status, StatusCode::NO_CONTENT);
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    assert_eq!(harness.job_tokens.delete.call_count(), 1);
}

#[tokio::test]
async fn test_missing_job_id_hides_parser_detail() {
    let harness = TestHarness::new();

    let response = post(
        harness.router(),
        "/test/markComplete",
        r#"{"executorName": "test-executor"}"#,
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Failed to parse request body"})
    );
    assert_eq!(harness.worker_store.mark_complete.call_count(), 0);
}
