use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use executor_queue_core::{
    ExecutionLogEntryOptions, QueueError, QueueRecord, QueueResult, StoreError,
};

use super::{ops, QueueHandler};
use crate::error::ApiResult;
use crate::requests::{decode, AddExecutionLogEntryRequest, UpdateExecutionLogEntryRequest};

fn log_entry_error(op: &'static str, err: StoreError) -> QueueError {
    match err {
        StoreError::ExecutionLogEntryNotUpdated => QueueError::UnknownJob,
        other => QueueError::op(op, other),
    }
}

impl<R: QueueRecord> QueueHandler<R> {
    /// Appends a log entry to a job the caller is processing and returns its id.
    pub async fn add_execution_log_entry(
        &self,
        request: &AddExecutionLogEntryRequest,
    ) -> QueueResult<i64> {
        self.worker_store
            .add_execution_log_entry(
                request.job_id,
                &request.entry,
                &ExecutionLogEntryOptions::processing(&request.executor_name),
            )
            .await
            .map_err(|err| log_entry_error(ops::ADD_EXECUTION_LOG_ENTRY, err))
    }

    pub async fn update_execution_log_entry(
        &self,
        request: &UpdateExecutionLogEntryRequest,
    ) -> QueueResult<()> {
        self.worker_store
            .update_execution_log_entry(
                request.job_id,
                request.entry_id,
                &request.entry,
                &ExecutionLogEntryOptions::processing(&request.executor_name),
            )
            .await
            .map_err(|err| log_entry_error(ops::UPDATE_EXECUTION_LOG_ENTRY, err))
    }
}

/// POST /{queue}/addExecutionLogEntry
pub async fn handle_add_execution_log_entry<R: QueueRecord>(
    State(handler): State<Arc<QueueHandler<R>>>,
    body: Bytes,
) -> ApiResult<Json<i64>> {
    let request: AddExecutionLogEntryRequest = decode(&body)?;
    let entry_id = handler.add_execution_log_entry(&request).await?;
    Ok(Json(entry_id))
}

/// POST /{queue}/updateExecutionLogEntry
pub async fn handle_update_execution_log_entry<R: QueueRecord>(
    State(handler): State<Arc<QueueHandler<R>>>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let request: UpdateExecutionLogEntryRequest = decode(&body)?;
    handler.update_execution_log_entry(&request).await?;
    Ok(StatusCode::NO_CONTENT)
}
