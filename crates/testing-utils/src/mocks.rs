//! Recording mock implementations for all collaborator traits
//!
//! Every mocked method is a [`MockFunc`]: return values are queued with
//! [`MockFunc::push_return`], fall back to a default hook once the queue is
//! drained, and each call's arguments are kept for later assertions.

use async_trait::async_trait;
use executor_queue_core::{
    ClientVersion, ExecutionLogEntry, ExecutionLogEntryOptions, Executor, ExecutorStore, Job,
    JobToken, JobTokenStore, MarkFinalOptions, QueueRecord, RecordTransformer, ResourceMetadata,
    StoreResult, WorkerStore,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type DefaultHook<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

struct MockFuncState<A, R> {
    queued: VecDeque<R>,
    default_hook: DefaultHook<A, R>,
    history: Vec<A>,
}

/// A single mocked method.
pub struct MockFunc<A, R> {
    state: Arc<Mutex<MockFuncState<A, R>>>,
}

impl<A: Clone, R> MockFunc<A, R> {
    pub fn new<F>(default_hook: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(MockFuncState {
                queued: VecDeque::new(),
                default_hook: Arc::new(default_hook),
                history: Vec::new(),
            })),
        }
    }

    /// Queues a return value for the next unanswered call.
    pub fn push_return(&self, value: R) {
        self.state.lock().unwrap().queued.push_back(value);
    }

    /// Replaces the hook used once queued values run out.
    pub fn set_default_hook<F>(&self, hook: F)
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.state.lock().unwrap().default_hook = Arc::new(hook);
    }

    pub fn history(&self) -> Vec<A> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().history.len()
    }

    pub fn call(&self, args: A) -> R {
        let mut state = self.state.lock().unwrap();
        let result = match state.queued.pop_front() {
            Some(value) => value,
            None => (state.default_hook)(&args),
        };
        state.history.push(args);
        result
    }
}

impl<A, R> Clone for MockFunc<A, R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// Minimal queue record for handler tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub id: i64,
}

impl TestRecord {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

impl QueueRecord for TestRecord {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// Mock implementation of WorkerStore for testing
pub struct MockWorkerStore<R> {
    pub dequeue: MockFunc<(String, Vec<String>), StoreResult<Option<R>>>,
    pub add_execution_log_entry:
        MockFunc<(i64, ExecutionLogEntry, ExecutionLogEntryOptions), StoreResult<i64>>,
    pub update_execution_log_entry:
        MockFunc<(i64, i64, ExecutionLogEntry, ExecutionLogEntryOptions), StoreResult<()>>,
    pub mark_complete: MockFunc<(i64, MarkFinalOptions), StoreResult<bool>>,
    pub mark_errored: MockFunc<(i64, String, MarkFinalOptions), StoreResult<bool>>,
    pub mark_failed: MockFunc<(i64, String, MarkFinalOptions), StoreResult<bool>>,
}

impl<R: Send + 'static> MockWorkerStore<R> {
    pub fn new() -> Self {
        Self {
            dequeue: MockFunc::new(|_| Ok(None)),
            add_execution_log_entry: MockFunc::new(|_| Ok(0)),
            update_execution_log_entry: MockFunc::new(|_| Ok(())),
            mark_complete: MockFunc::new(|_| Ok(false)),
            mark_errored: MockFunc::new(|_| Ok(false)),
            mark_failed: MockFunc::new(|_| Ok(false)),
        }
    }
}

impl<R: Send + 'static> Default for MockWorkerStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for MockWorkerStore<R> {
    fn clone(&self) -> Self {
        Self {
            dequeue: self.dequeue.clone(),
            add_execution_log_entry: self.add_execution_log_entry.clone(),
            update_execution_log_entry: self.update_execution_log_entry.clone(),
            mark_complete: self.mark_complete.clone(),
            mark_errored: self.mark_errored.clone(),
            mark_failed: self.mark_failed.clone(),
        }
    }
}

#[async_trait]
impl<R: QueueRecord> WorkerStore<R> for MockWorkerStore<R> {
    async fn dequeue(
        &self,
        worker_hostname: &str,
        extra_conditions: &[String],
    ) -> StoreResult<Option<R>> {
        self.dequeue
            .call((worker_hostname.to_string(), extra_conditions.to_vec()))
    }

    async fn add_execution_log_entry(
        &self,
        id: i64,
        entry: &ExecutionLogEntry,
        options: &ExecutionLogEntryOptions,
    ) -> StoreResult<i64> {
        self.add_execution_log_entry
            .call((id, entry.clone(), options.clone()))
    }

    async fn update_execution_log_entry(
        &self,
        id: i64,
        entry_id: i64,
        entry: &ExecutionLogEntry,
        options: &ExecutionLogEntryOptions,
    ) -> StoreResult<()> {
        self.update_execution_log_entry
            .call((id, entry_id, entry.clone(), options.clone()))
    }

    async fn mark_complete(&self, id: i64, options: &MarkFinalOptions) -> StoreResult<bool> {
        self.mark_complete.call((id, options.clone()))
    }

    async fn mark_errored(
        &self,
        id: i64,
        failure_message: &str,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool> {
        self.mark_errored
            .call((id, failure_message.to_string(), options.clone()))
    }

    async fn mark_failed(
        &self,
        id: i64,
        failure_message: &str,
        options: &MarkFinalOptions,
    ) -> StoreResult<bool> {
        self.mark_failed
            .call((id, failure_message.to_string(), options.clone()))
    }
}

/// Mock implementation of JobTokenStore for testing
#[derive(Clone)]
pub struct MockJobTokenStore {
    pub create: MockFunc<(i64, String), StoreResult<String>>,
    pub exists: MockFunc<(i64, String), StoreResult<bool>>,
    pub regenerate: MockFunc<(i64, String), StoreResult<String>>,
    pub delete: MockFunc<(i64, String), StoreResult<()>>,
    pub get_by_token: MockFunc<String, StoreResult<JobToken>>,
    pub purge_expired: MockFunc<(), StoreResult<u64>>,
}

impl MockJobTokenStore {
    pub fn new() -> Self {
        Self {
            create: MockFunc::new(|_| Ok(String::new())),
            exists: MockFunc::new(|_| Ok(false)),
            regenerate: MockFunc::new(|_| Ok(String::new())),
            delete: MockFunc::new(|_| Ok(())),
            get_by_token: MockFunc::new(|_| Ok(JobToken::new(0, ""))),
            purge_expired: MockFunc::new(|_| Ok(0)),
        }
    }
}

impl Default for MockJobTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobTokenStore for MockJobTokenStore {
    async fn create(&self, job_id: i64, queue: &str) -> StoreResult<String> {
        self.create.call((job_id, queue.to_string()))
    }

    async fn exists(&self, job_id: i64, queue: &str) -> StoreResult<bool> {
        self.exists.call((job_id, queue.to_string()))
    }

    async fn regenerate(&self, job_id: i64, queue: &str) -> StoreResult<String> {
        self.regenerate.call((job_id, queue.to_string()))
    }

    async fn delete(&self, job_id: i64, queue: &str) -> StoreResult<()> {
        self.delete.call((job_id, queue.to_string()))
    }

    async fn get_by_token(&self, token: &str) -> StoreResult<JobToken> {
        self.get_by_token.call(token.to_string())
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        self.purge_expired.call(())
    }
}

/// Mock implementation of ExecutorStore for testing
#[derive(Clone)]
pub struct MockExecutorStore {
    pub get_by_hostname: MockFunc<String, StoreResult<Option<Executor>>>,
}

impl MockExecutorStore {
    pub fn new() -> Self {
        Self {
            get_by_hostname: MockFunc::new(|_| Ok(None)),
        }
    }
}

impl Default for MockExecutorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutorStore for MockExecutorStore {
    async fn get_by_hostname(&self, hostname: &str) -> StoreResult<Option<Executor>> {
        self.get_by_hostname.call(hostname.to_string())
    }
}

/// Mock record transformer. By default returns an empty job carrying the
/// record's id.
pub struct MockRecordTransformer {
    pub transform: MockFunc<(ClientVersion, i64, ResourceMetadata), anyhow::Result<Job>>,
}

impl MockRecordTransformer {
    pub fn new() -> Self {
        Self {
            transform: MockFunc::new(|(_, id, _): &(ClientVersion, i64, ResourceMetadata)| {
                Ok(Job {
                    id: *id,
                    ..Default::default()
                })
            }),
        }
    }
}

impl Default for MockRecordTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockRecordTransformer {
    fn clone(&self) -> Self {
        Self {
            transform: self.transform.clone(),
        }
    }
}

#[async_trait]
impl<R: QueueRecord> RecordTransformer<R> for MockRecordTransformer {
    async fn transform(
        &self,
        version: &ClientVersion,
        record: &R,
        resources: &ResourceMetadata,
    ) -> anyhow::Result<Job> {
        self.transform
            .call((version.clone(), record.record_id(), resources.clone()))
    }
}
