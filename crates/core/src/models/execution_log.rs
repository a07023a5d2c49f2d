use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job state under which execution log entries may be attached.
pub const PROCESSING_STATE: &str = "processing";

/// 执行日志条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogEntry {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub command: Vec<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub out: String,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

/// Scopes a log entry write to the caller's lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionLogEntryOptions {
    pub worker_hostname: String,
    pub state: String,
}

impl ExecutionLogEntryOptions {
    pub fn processing(worker_hostname: impl Into<String>) -> Self {
        Self {
            worker_hostname: worker_hostname.into(),
            state: PROCESSING_STATE.to_string(),
        }
    }
}

/// 终结操作的作用域
///
/// `worker_hostname` 为 `None` 时不校验租约归属。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkFinalOptions {
    pub worker_hostname: Option<String>,
}

impl MarkFinalOptions {
    pub fn for_worker(worker_hostname: impl Into<String>) -> Self {
        Self {
            worker_hostname: Some(worker_hostname.into()),
        }
    }
}
