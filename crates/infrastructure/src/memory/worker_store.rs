use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use executor_queue_core::{
    ExecutionLogEntry, ExecutionLogEntryOptions, MarkFinalOptions, QueueRecord, StoreError,
    StoreResult, WorkerStore, PROCESSING_STATE,
};
use tokio::sync::Mutex;
use tracing::debug;

/// 记录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Queued,
    Processing,
    Completed,
    Errored,
    Failed,
}

#[derive(Debug, Clone)]
struct StoredRecord<R> {
    record: R,
    state: RecordState,
    worker_hostname: Option<String>,
    failure_message: Option<String>,
    execution_logs: Vec<ExecutionLogEntry>,
}

impl<R> StoredRecord<R> {
    fn leased_to(&self, worker_hostname: &str) -> bool {
        self.state == RecordState::Processing
            && self.worker_hostname.as_deref() == Some(worker_hostname)
    }

    fn finalizable_by(&self, options: &MarkFinalOptions) -> bool {
        match &options.worker_hostname {
            Some(hostname) => self.leased_to(hostname),
            None => self.state == RecordState::Processing,
        }
    }
}

/// 内存队列存储
///
/// 记录按 ID 升序出队；所有状态变更在同一把锁内完成，
/// 因此并发的出队请求不会拿到同一条记录。
pub struct InMemoryWorkerStore<R> {
    records: Arc<Mutex<BTreeMap<i64, StoredRecord<R>>>>,
}

impl<R> Clone for InMemoryWorkerStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R: QueueRecord> Default for InMemoryWorkerStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: QueueRecord> InMemoryWorkerStore<R> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// 入队，ID 已存在时返回 false
    pub async fn enqueue(&self, record: R) -> bool {
        let mut records = self.records.lock().await;
        let id = record.record_id();
        if records.contains_key(&id) {
            return false;
        }

        records.insert(
            id,
            StoredRecord {
                record,
                state: RecordState::Queued,
                worker_hostname: None,
                failure_message: None,
                execution_logs: Vec::new(),
            },
        );
        true
    }

    pub async fn state(&self, id: i64) -> Option<RecordState> {
        self.records.lock().await.get(&id).map(|r| r.state)
    }

    pub async fn worker_hostname(&self, id: i64) -> Option<String> {
        self.records
            .lock()
            .await
            .get(&id)
            .and_then(|r| r.worker_hostname.clone())
    }

    pub async fn failure_message(&self, id: i64) -> Option<String> {
        self.records
            .lock()
            .await
            .get(&id)
            .and_then(|r| r.failure_message.clone())
    }

    pub async fn execution_logs(&self, id: i64) -> Vec<ExecutionLogEntry> {
        self.records
            .lock()
            .await
            .get(&id)
            .map(|r| r.execution_logs.clone())
            .unwrap_or_default()
    }

    async fn finalize(
        &self,
        id: i64,
        state: RecordState,
        failure_message: Option<&str>,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool> {
        let mut records = self.records.lock().await;
        let Some(stored) = records.get_mut(&id) else {
            return Ok(false);
        };
        if !stored.finalizable_by(options) {
            return Ok(false);
        }

        stored.state = state;
        stored.failure_message = failure_message.map(str::to_string);
        debug!("Record {} finalized as {:?}", id, state);
        Ok(true)
    }
}

fn check_log_scope(options: &ExecutionLogEntryOptions) -> StoreResult<()> {
    if options.state != PROCESSING_STATE {
        return Err(StoreError::ExecutionLogEntryNotUpdated);
    }
    Ok(())
}

#[async_trait]
impl<R: QueueRecord + Clone> WorkerStore<R> for InMemoryWorkerStore<R> {
    /// `extra_conditions` are SQL fragments for database-backed stores and
    /// have no meaning here.
    async fn dequeue(
        &self,
        worker_hostname: &str,
        _extra_conditions: &[String],
    ) -> StoreResult<Option<R>> {
        let mut records = self.records.lock().await;
        let next = records
            .values_mut()
            .find(|stored| stored.state == RecordState::Queued);

        Ok(next.map(|stored| {
            stored.state = RecordState::Processing;
            stored.worker_hostname = Some(worker_hostname.to_string());
            debug!(
                "Record {} leased to {}",
                stored.record.record_id(),
                worker_hostname
            );
            stored.record.clone()
        }))
    }

    async fn add_execution_log_entry(
        &self,
        id: i64,
        entry: &ExecutionLogEntry,
        options: &ExecutionLogEntryOptions,
    ) -> StoreResult<i64> {
        check_log_scope(options)?;

        let mut records = self.records.lock().await;
        let stored = records
            .get_mut(&id)
            .filter(|stored| stored.leased_to(&options.worker_hostname))
            .ok_or(StoreError::ExecutionLogEntryNotUpdated)?;

        stored.execution_logs.push(entry.clone());
        Ok(stored.execution_logs.len() as i64)
    }

    async fn update_execution_log_entry(
        &self,
        id: i64,
        entry_id: i64,
        entry: &ExecutionLogEntry,
        options: &ExecutionLogEntryOptions,
    ) -> StoreResult<()> {
        check_log_scope(options)?;

        let mut records = self.records.lock().await;
        let stored = records
            .get_mut(&id)
            .filter(|stored| stored.leased_to(&options.worker_hostname))
            .ok_or(StoreError::ExecutionLogEntryNotUpdated)?;

        // 条目 ID 从 1 开始
        let slot = usize::try_from(entry_id.saturating_sub(1))
            .ok()
            .and_then(|index| stored.execution_logs.get_mut(index))
            .ok_or(StoreError::ExecutionLogEntryNotUpdated)?;
        *slot = entry.clone();
        Ok(())
    }

    async fn mark_complete(&self, id: i64, options: &MarkFinalOptions) -> StoreResult<bool> {
        self.finalize(id, RecordState::Completed, None, options)
            .await
    }

    async fn mark_errored(
        &self,
        id: i64,
        failure_message: &str,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool> {
        self.finalize(id, RecordState::Errored, Some(failure_message), options)
            .await
    }

    async fn mark_failed(
        &self,
        id: i64,
        failure_message: &str,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool> {
        self.finalize(id, RecordState::Failed, Some(failure_message), options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use executor_queue_testing_utils::{ExecutionLogEntryBuilder, TestRecord};

    async fn store_with(ids: &[i64]) -> InMemoryWorkerStore<TestRecord> {
        let store = InMemoryWorkerStore::new();
        for id in ids {
            assert!(store.enqueue(TestRecord::new(*id)).await);
        }
        store
    }

    #[tokio::test]
    async fn test_dequeue_leases_in_id_order() {
        let store = store_with(&[2, 1]).await;

        let first = store.dequeue("host-a", &[]).await.unwrap();
        let second = store.dequeue("host-b", &[]).await.unwrap();
        let third = store.dequeue("host-c", &[]).await.unwrap();

        assert_eq!(first, Some(TestRecord::new(1)));
        assert_eq!(second, Some(TestRecord::new(2)));
        assert_eq!(third, None);
        assert_eq!(store.state(1).await, Some(RecordState::Processing));
        assert_eq!(store.worker_hostname(2).await.as_deref(), Some("host-b"));
    }

    #[tokio::test]
    async fn test_duplicate_enqueue_rejected() {
        let store = store_with(&[1]).await;
        assert!(!store.enqueue(TestRecord::new(1)).await);
    }

    #[tokio::test]
    async fn test_concurrent_dequeues_never_share_a_record() {
        let store = store_with(&(1..=20).collect::<Vec<_>>()).await;

        let mut handles = Vec::new();
        for i in 0..40 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.dequeue(&format!("host-{i}"), &[]).await.unwrap()
            }));
        }

        let mut leased = Vec::new();
        for handle in handles {
            if let Some(record) = handle.await.unwrap() {
                leased.push(record.id);
            }
        }
        leased.sort();
        assert_eq!(leased, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_log_entries_scoped_to_lease() {
        let store = store_with(&[1]).await;
        let entry = ExecutionLogEntryBuilder::new().build();
        let owner = ExecutionLogEntryOptions::processing("host-a");
        let stranger = ExecutionLogEntryOptions::processing("host-b");

        // 未出队
        assert!(matches!(
            store.add_execution_log_entry(1, &entry, &owner).await,
            Err(StoreError::ExecutionLogEntryNotUpdated)
        ));

        store.dequeue("host-a", &[]).await.unwrap();
        assert_eq!(store.add_execution_log_entry(1, &entry, &owner).await.unwrap(), 1);
        assert_eq!(store.add_execution_log_entry(1, &entry, &owner).await.unwrap(), 2);
        assert!(matches!(
            store.add_execution_log_entry(1, &entry, &stranger).await,
            Err(StoreError::ExecutionLogEntryNotUpdated)
        ));

        let updated = ExecutionLogEntryBuilder::new().with_out("updated").build();
        store
            .update_execution_log_entry(1, 2, &updated, &owner)
            .await
            .unwrap();
        assert!(matches!(
            store.update_execution_log_entry(1, 3, &updated, &owner).await,
            Err(StoreError::ExecutionLogEntryNotUpdated)
        ));
        assert!(matches!(
            store.update_execution_log_entry(1, 0, &updated, &owner).await,
            Err(StoreError::ExecutionLogEntryNotUpdated)
        ));

        let logs = store.execution_logs(1).await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].out, "updated");
    }

    #[tokio::test]
    async fn test_finalization_is_one_way() {
        let store = store_with(&[1]).await;
        store.dequeue("host-a", &[]).await.unwrap();
        let owner = MarkFinalOptions::for_worker("host-a");

        assert!(!store
            .mark_complete(1, &MarkFinalOptions::for_worker("host-b"))
            .await
            .unwrap());
        assert!(store.mark_errored(1, "boom", &owner).await.unwrap());
        assert!(!store.mark_complete(1, &owner).await.unwrap());
        assert!(!store.mark_failed(1, "again", &owner).await.unwrap());

        assert_eq!(store.state(1).await, Some(RecordState::Errored));
        assert_eq!(store.failure_message(1).await.as_deref(), Some("boom"));

        let entry = ExecutionLogEntryBuilder::new().build();
        assert!(store
            .add_execution_log_entry(1, &entry, &ExecutionLogEntryOptions::processing("host-a"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unscoped_mark_failed_releases_any_lease() {
        let store = store_with(&[1]).await;
        store.dequeue("host-a", &[]).await.unwrap();

        assert!(store
            .mark_failed(1, "failed to transform record: bad", &MarkFinalOptions::default())
            .await
            .unwrap());
        assert_eq!(store.state(1).await, Some(RecordState::Failed));
        assert!(!store.mark_complete(99, &MarkFinalOptions::default()).await.unwrap());
    }
}
