use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use executor_queue_core::{MarkFinalOptions, QueueError, QueueRecord, QueueResult};
use serde_json::Value;
use tracing::{debug, info};

use super::{ops, QueueHandler};
use crate::error::ApiResult;
use crate::requests::{decode, MarkCompleteRequest, MarkFailureRequest};

/// 终结状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalization {
    Complete,
    Errored(String),
    Failed(String),
}

impl Finalization {
    fn op(&self) -> &'static str {
        match self {
            Finalization::Complete => ops::MARK_COMPLETE,
            Finalization::Errored(_) => ops::MARK_ERRORED,
            Finalization::Failed(_) => ops::MARK_FAILED,
        }
    }
}

impl<R: QueueRecord> QueueHandler<R> {
    /// 终结调用方持有的任务并吊销其令牌
    ///
    /// 返回 `false` 表示任务已不归调用方所有，此时不会删除令牌。
    pub async fn finalize(
        &self,
        executor_name: &str,
        job_id: i64,
        outcome: &Finalization,
    ) -> QueueResult<bool> {
        let options = MarkFinalOptions::for_worker(executor_name);
        let marked = match outcome {
            Finalization::Complete => self.worker_store.mark_complete(job_id, &options).await,
            Finalization::Errored(message) => {
                self.worker_store
                    .mark_errored(job_id, message, &options)
                    .await
            }
            Finalization::Failed(message) => {
                self.worker_store
                    .mark_failed(job_id, message, &options)
                    .await
            }
        };

        let found = marked.map_err(|err| QueueError::op(outcome.op(), err))?;
        if !found {
            debug!(queue = %self.name, job_id, "任务不存在或不属于该executor");
            return Ok(false);
        }

        self.job_tokens
            .delete(job_id, &self.name)
            .await
            .map_err(|err| QueueError::op(ops::DELETE_TOKEN, err))?;

        info!(queue = %self.name, executor = %executor_name, job_id, "任务已终结: {:?}", outcome);
        Ok(true)
    }
}

async fn respond<R: QueueRecord>(
    handler: &QueueHandler<R>,
    executor_name: &str,
    job_id: i64,
    outcome: Finalization,
) -> ApiResult<Response> {
    if handler.finalize(executor_name, job_id, &outcome).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((StatusCode::NOT_FOUND, Json(Value::Null)).into_response())
    }
}

/// POST /{queue}/markComplete
pub async fn handle_mark_complete<R: QueueRecord>(
    State(handler): State<Arc<QueueHandler<R>>>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: MarkCompleteRequest = decode(&body)?;
    respond(
        &handler,
        &request.executor_name,
        request.job_id,
        Finalization::Complete,
    )
    .await
}

/// POST /{queue}/markErrored
pub async fn handle_mark_errored<R: QueueRecord>(
    State(handler): State<Arc<QueueHandler<R>>>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: MarkFailureRequest = decode(&body)?;
    respond(
        &handler,
        &request.executor_name,
        request.job_id,
        Finalization::Errored(request.error_message),
    )
    .await
}

/// POST /{queue}/markFailed
pub async fn handle_mark_failed<R: QueueRecord>(
    State(handler): State<Arc<QueueHandler<R>>>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: MarkFailureRequest = decode(&body)?;
    respond(
        &handler,
        &request.executor_name,
        request.job_id,
        Finalization::Failed(request.error_message),
    )
    .await
}
