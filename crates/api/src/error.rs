use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use executor_queue_core::QueueError;
use serde_json::json;
use tracing::{error, warn};

/// 队列操作失败时返回给 executor 的错误
///
/// 请求错误映射为 400，其余一律 500，响应体为 `{"error": "<message>"}`。
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] QueueError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn into_inner(self) -> QueueError {
        self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!("队列操作失败: {}", message);
        } else {
            warn!("请求参数错误: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
