use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

/// 记录每个 executor 请求的路径、状态码和耗时
///
/// 5xx 以 warn 级别记录，其余为 info。
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();
    debug!(%method, %path, "收到 executor 请求");

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        warn!(%method, %path, status, elapsed_ms, "executor 请求处理失败");
    } else {
        info!(%method, %path, status, elapsed_ms, "executor 请求完成");
    }

    response
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
