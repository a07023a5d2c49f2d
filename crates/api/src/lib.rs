//! # Executor Queue API
//!
//! executor 拉取任务所用的 HTTP 协议层，基于 Axum 构建。
//!
//! ## API 端点
//!
//! 每个队列挂载在以队列名命名的路径下：
//! - `POST /{queue}` 或 `POST /{queue}/` - 出队，返回任务载荷（200）或无任务（204）
//! - `POST /{queue}/addExecutionLogEntry` - 追加执行日志，返回条目 ID
//! - `POST /{queue}/updateExecutionLogEntry` - 更新执行日志
//! - `POST /{queue}/markComplete` - 标记完成
//! - `POST /{queue}/markErrored` - 标记出错（可重试）
//! - `POST /{queue}/markFailed` - 标记失败
//!
//! ## 认证
//!
//! 所有端点都经过 [`auth::auth_middleware`]，支持 `token-executor <secret>`
//! 共享密钥和 `Bearer <token>` 任务令牌两种方案。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use executor_queue_api::{auth::AuthGate, create_app, handler::QueueHandler, routes::queue_router};
//! use std::sync::Arc;
//!
//! let gate = AuthGate::new(job_tokens.clone(), executors, executors_config);
//! let handler = Arc::new(QueueHandler::new("batches", worker_store, transformer, job_tokens));
//! let app = create_app(vec![queue_router(handler, gate)], &api_config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod requests;
pub mod routes;

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, Router};
use executor_queue_core::config::ApiConfig;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use middleware::{request_logging, trace_layer};

pub use auth::AuthGate;
pub use error::{ApiError, ApiResult};
pub use handler::QueueHandler;
pub use routes::{queue_router, queue_routes};

/// 合并所有队列路由并加上通用中间件
pub fn create_app(queue_routers: Vec<Router>, api_config: &ApiConfig) -> Router {
    let max_body_bytes = api_config.max_request_size_mb.saturating_mul(1024 * 1024);

    queue_routers
        .into_iter()
        .fold(Router::new(), |app, queue| app.merge(queue))
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    api_config.request_timeout_seconds,
                )))
                .layer(axum::middleware::from_fn(request_logging))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(DefaultBodyLimit::disable()),
        )
}
