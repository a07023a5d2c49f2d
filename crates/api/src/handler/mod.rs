//! 队列协议处理器
//!
//! 每个队列对应一个 [`QueueHandler`]，负责出队租约、执行日志和终结三类操作。
//! 处理器本身不持有状态，所有状态都在队列存储和任务令牌存储中。

pub mod dequeue;
pub mod execution_log;
pub mod finalize;

use std::sync::Arc;

use executor_queue_core::{JobTokenStore, QueueRecord, RecordTransformer, WorkerStore};

pub use finalize::Finalization;

/// Operation prefixes attached to collaborator failures.
pub mod ops {
    pub const DEQUEUE: &str = "dbworkerstore.Dequeue";
    pub const ADD_EXECUTION_LOG_ENTRY: &str = "dbworkerstore.AddExecutionLogEntry";
    pub const UPDATE_EXECUTION_LOG_ENTRY: &str = "dbworkerstore.UpdateExecutionLogEntry";
    pub const MARK_COMPLETE: &str = "dbworkerstore.MarkComplete";
    pub const MARK_ERRORED: &str = "dbworkerstore.MarkErrored";
    pub const MARK_FAILED: &str = "dbworkerstore.MarkFailed";
    pub const CREATE_TOKEN: &str = "CreateToken";
    pub const EXISTS: &str = "Exists";
    pub const REGENERATE: &str = "Regenerate";
    pub const DELETE_TOKEN: &str = "jobTokenStore.Delete";
}

pub struct QueueHandler<R: QueueRecord> {
    name: String,
    worker_store: Arc<dyn WorkerStore<R>>,
    record_transformer: Arc<dyn RecordTransformer<R>>,
    job_tokens: Arc<dyn JobTokenStore>,
}

impl<R: QueueRecord> QueueHandler<R> {
    pub fn new(
        name: impl Into<String>,
        worker_store: Arc<dyn WorkerStore<R>>,
        record_transformer: Arc<dyn RecordTransformer<R>>,
        job_tokens: Arc<dyn JobTokenStore>,
    ) -> Self {
        Self {
            name: name.into(),
            worker_store,
            record_transformer,
            job_tokens,
        }
    }

    /// Queue name; also the route prefix.
    pub fn name(&self) -> &str {
        &self.name
    }
}
