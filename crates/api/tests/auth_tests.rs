mod common;

use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use common::{send, TestHarness, QUEUE};
use executor_queue_api::{
    auth::{auth_middleware, AuthGate, QueueAuthState},
    create_app, queue_router,
};
use executor_queue_core::{
    config::ApiConfig, Executor, ExecutorsConfig, JobToken, LiveConfig, StoreError,
};

const BODY: &str = r#"{"executorName": "test-executor", "jobId": 42}"#;

fn executors_config(access_token: &str) -> LiveConfig<ExecutorsConfig> {
    LiveConfig::new(ExecutorsConfig {
        access_token: access_token.to_string(),
        queues: vec![QUEUE.to_string()],
        ..Default::default()
    })
}

fn gate(harness: &TestHarness, config: LiveConfig<ExecutorsConfig>) -> AuthGate {
    AuthGate::new(
        Arc::new(harness.job_tokens.clone()),
        Arc::new(harness.executors.clone()),
        config,
    )
}

/// 下游路由固定返回 418，用来确认请求通过了认证
fn teapot_router(gate: AuthGate) -> Router {
    Router::new()
        .route("/test", get(|| async { StatusCode::IM_A_TEAPOT }))
        .route_layer(from_fn_with_state(
            QueueAuthState::new(QUEUE, gate),
            auth_middleware,
        ))
}

async fn call(harness: &TestHarness, authorization: Option<&str>, body: &str) -> common::TestResponse {
    let router = teapot_router(gate(harness, executors_config("hunter2")));
    send(router, Method::GET, "/test", authorization, body).await
}

#[tokio::test]
async fn test_authorized_job_token() {
    let harness = TestHarness::new();
    harness
        .job_tokens
        .get_by_token
        .push_return(Ok(JobToken::new(42, "test")));
    harness
        .executors
        .get_by_hostname
        .push_return(Ok(Some(Executor::new("test-executor"))));

    let response = call(&harness, Some("Bearer somejobtoken"), BODY).await;

    assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(response.body, "");
    assert_eq!(harness.job_tokens.get_by_token.history(), vec!["somejobtoken"]);
    assert_eq!(harness.executors.get_by_hostname.history(), vec!["test-executor"]);
}

#[tokio::test]
async fn test_authorized_shared_secret_skips_lookups() {
    let harness = TestHarness::new();

    let response = call(&harness, Some("token-executor hunter2"), BODY).await;

    assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(harness.job_tokens.get_by_token.call_count(), 0);
    assert_eq!(harness.executors.get_by_hostname.call_count(), 0);
}

#[tokio::test]
async fn test_request_rejections() {
    let cases: Vec<(&str, Option<&str>, &str, StatusCode, &str)> = vec![
        (
            "no request body",
            None,
            "",
            StatusCode::BAD_REQUEST,
            "No request body provided\n",
        ),
        (
            "malformed request body",
            None,
            r#"{"executorName": "test-executor""#,
            StatusCode::BAD_REQUEST,
            "Failed to parse request body\n",
        ),
        (
            "no worker hostname",
            None,
            r#"{"jobId": 42}"#,
            StatusCode::BAD_REQUEST,
            "worker hostname cannot be empty\n",
        ),
        (
            "no authorization header",
            None,
            BODY,
            StatusCode::UNAUTHORIZED,
            "no token value in the HTTP Authorization request header\n",
        ),
        (
            "invalid header parts",
            Some("token-executor"),
            BODY,
            StatusCode::UNAUTHORIZED,
            "HTTP Authorization request header value must be of the following form: 'Bearer \"TOKEN\"' or 'token-executor TOKEN'\n",
        ),
        (
            "invalid header prefix",
            Some("Foo bar"),
            BODY,
            StatusCode::UNAUTHORIZED,
            "unrecognized HTTP Authorization request header scheme (supported values: \"Bearer\", \"token-executor\")\n",
        ),
        (
            "invalid shared secret",
            Some("token-executor hunter1"),
            BODY,
            StatusCode::FORBIDDEN,
            "",
        ),
    ];

    for (name, authorization, body, status, expected_body) in cases {
        let harness = TestHarness::new();
        let response = call(&harness, authorization, body).await;

        assert_eq!(response.status, status, "case: {name}");
        assert_eq!(response.body, expected_body, "case: {name}");
        assert_eq!(harness.job_tokens.get_by_token.call_count(), 0, "case: {name}");
    }
}

#[tokio::test]
async fn test_job_token_lookup_failure() {
    let harness = TestHarness::new();
    harness
        .job_tokens
        .get_by_token
        .push_return(Err(StoreError::other("failed to find job token")));

    let response = call(&harness, Some("Bearer somejobtoken"), BODY).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, "invalid token\n");
    assert_eq!(harness.job_tokens.get_by_token.history(), vec!["somejobtoken"]);
    assert_eq!(harness.executors.get_by_hostname.call_count(), 0);
}

#[tokio::test]
async fn test_job_token_scope_mismatch() {
    for token in [JobToken::new(7, "test"), JobToken::new(42, "test1")] {
        let harness = TestHarness::new();
        harness.job_tokens.get_by_token.push_return(Ok(token.clone()));

        let response = call(&harness, Some("Bearer somejobtoken"), BODY).await;

        assert_eq!(response.status, StatusCode::FORBIDDEN, "token: {token:?}");
        assert_eq!(response.body, "invalid token\n");
        assert_eq!(harness.executors.get_by_hostname.call_count(), 0);
    }
}

#[tokio::test]
async fn test_unknown_executor_host() {
    let lookups = [
        Err(StoreError::other("executor does not exist")),
        Ok(None),
    ];

    for lookup in lookups {
        let harness = TestHarness::new();
        harness
            .job_tokens
            .get_by_token
            .push_return(Ok(JobToken::new(42, "test")));
        harness.executors.get_by_hostname.push_return(lookup);

        let response = call(&harness, Some("Bearer somejobtoken"), BODY).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, "invalid token\n");
        assert_eq!(harness.executors.get_by_hostname.history(), vec!["test-executor"]);
    }
}

#[tokio::test]
async fn test_empty_shared_secret_never_matches() {
    let harness = TestHarness::new();
    let router = teapot_router(gate(&harness, executors_config("")));

    let response = send(router, Method::GET, "/test", Some("token-executor "), BODY).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rotated_shared_secret_takes_effect_immediately() {
    let harness = TestHarness::new();
    let config = executors_config("hunter2");
    let router = teapot_router(gate(&harness, config.clone()));

    let before = send(router.clone(), Method::GET, "/test", Some("token-executor hunter2"), BODY).await;
    assert_eq!(before.status, StatusCode::IM_A_TEAPOT);

    config
        .replace(ExecutorsConfig {
            access_token: "hunter3".to_string(),
            queues: vec![QUEUE.to_string()],
            ..Default::default()
        })
        .await;

    let stale = send(router.clone(), Method::GET, "/test", Some("token-executor hunter2"), BODY).await;
    assert_eq!(stale.status, StatusCode::FORBIDDEN);

    let fresh = send(router, Method::GET, "/test", Some("token-executor hunter3"), BODY).await;
    assert_eq!(fresh.status, StatusCode::IM_A_TEAPOT);
}

#[tokio::test]
async fn test_body_is_restored_for_downstream_handler() {
    let harness = TestHarness::new();
    let router = Router::new()
        .route("/test", post(|body: String| async move { body }))
        .route_layer(from_fn_with_state(
            QueueAuthState::new(QUEUE, gate(&harness, executors_config("hunter2"))),
            auth_middleware,
        ));

    let response = send(router, Method::POST, "/test", Some("token-executor hunter2"), BODY).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, BODY);
}

#[tokio::test]
async fn test_queue_router_requires_authentication() {
    let harness = TestHarness::new();
    let router = queue_router(harness.handler(), gate(&harness, executors_config("hunter2")));

    let response = send(
        router,
        Method::POST,
        "/test/markComplete",
        None,
        BODY,
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(harness.worker_store.mark_complete.call_count(), 0);
}

fn limited_app(harness: &TestHarness, max_request_size_mb: usize) -> Router {
    let api_config = ApiConfig {
        max_request_size_mb,
        ..Default::default()
    };
    create_app(
        vec![teapot_router(gate(harness, executors_config("hunter2")))],
        &api_config,
    )
}

fn padded_body(padding: usize) -> String {
    format!(
        r#"{{"executorName": "test-executor", "jobId": 42, "padding": "{}"}}"#,
        "x".repeat(padding)
    )
}

#[tokio::test]
async fn test_streamed_body_over_limit_is_payload_too_large() {
    let harness = TestHarness::new();
    let app = limited_app(&harness, 1);

    // 没有 Content-Length，超限只能在读取请求体时发现
    let response = send(
        app,
        Method::GET,
        "/test",
        Some("token-executor hunter2"),
        &padded_body(2 * 1024 * 1024),
    )
    .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(harness.job_tokens.get_by_token.call_count(), 0);
}

#[tokio::test]
async fn test_body_within_configured_limit_is_accepted() {
    let harness = TestHarness::new();
    let app = limited_app(&harness, 4);

    let response = send(
        app,
        Method::GET,
        "/test",
        Some("token-executor hunter2"),
        &padded_body(3 * 1024 * 1024),
    )
    .await;

    assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
}
