use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::models::{ExecutionLogEntry, ExecutionLogEntryOptions, MarkFinalOptions};

/// 队列中的一条记录，协议层只关心它的 ID
pub trait QueueRecord: Send + Sync + 'static {
    fn record_id(&self) -> i64;
}

/// 队列存储接口
///
/// 实现方负责出队时的排他租约：两个并发的 `dequeue` 永远不会返回同一条记录。
/// 所有写操作都以调用方的主机名为作用域。
#[async_trait]
pub trait WorkerStore<R: QueueRecord>: Send + Sync {
    /// 为 `worker_hostname` 租出下一条排队中的记录，没有可用记录时返回 `None`
    async fn dequeue(
        &self,
        worker_hostname: &str,
        extra_conditions: &[String],
    ) -> StoreResult<Option<R>>;

    /// 追加一条执行日志，返回新条目的 ID
    ///
    /// 记录不再处于调用方租约下的 `processing` 状态时返回
    /// [`crate::errors::StoreError::ExecutionLogEntryNotUpdated`]。
    async fn add_execution_log_entry(
        &self,
        id: i64,
        entry: &ExecutionLogEntry,
        options: &ExecutionLogEntryOptions,
    ) -> StoreResult<i64>;

    async fn update_execution_log_entry(
        &self,
        id: i64,
        entry_id: i64,
        entry: &ExecutionLogEntry,
        options: &ExecutionLogEntryOptions,
    ) -> StoreResult<()>;

    /// 返回值表示记录是否仍可被调用方终结
    async fn mark_complete(&self, id: i64, options: &MarkFinalOptions) -> StoreResult<bool>;

    async fn mark_errored(
        &self,
        id: i64,
        failure_message: &str,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool>;

    async fn mark_failed(
        &self,
        id: i64,
        failure_message: &str,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool>;
}
