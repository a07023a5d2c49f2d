//! Request bodies posted by executors.

use axum::body::Bytes;
use executor_queue_core::{ExecutionLogEntry, QueueError, QueueResult, ResourceMetadata};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DequeueRequest {
    #[serde(default)]
    pub executor_name: String,
    /// Executor build version; empty selects the baseline wire format.
    #[serde(default)]
    pub version: String,
    #[serde(flatten)]
    pub resources: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExecutionLogEntryRequest {
    #[serde(default)]
    pub executor_name: String,
    pub job_id: i64,
    #[serde(flatten)]
    pub entry: ExecutionLogEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExecutionLogEntryRequest {
    #[serde(default)]
    pub executor_name: String,
    pub job_id: i64,
    pub entry_id: i64,
    #[serde(flatten)]
    pub entry: ExecutionLogEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCompleteRequest {
    #[serde(default)]
    pub executor_name: String,
    pub job_id: i64,
}

/// Body shared by `markErrored` and `markFailed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkFailureRequest {
    #[serde(default)]
    pub executor_name: String,
    pub job_id: i64,
    #[serde(default)]
    pub error_message: String,
}

pub(crate) fn decode<T: DeserializeOwned>(body: &Bytes) -> QueueResult<T> {
    serde_json::from_slice(body).map_err(|err| {
        debug!("请求体解析失败: {}", err);
        QueueError::bad_request("Failed to parse request body")
    })
}
