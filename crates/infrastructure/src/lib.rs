//! 协作者实现：任务令牌存储、executor 目录和内存队列存储
//!
//! - `memory` - 进程内实现，用于单机部署和测试
//! - `database` - PostgreSQL 实现
//! - `cleanup_service` - 定期删除过期任务令牌

pub mod cleanup_service;
pub mod database;
pub mod memory;
pub mod queued_job;
pub mod token;

pub use cleanup_service::TokenCleanupService;
pub use database::{DatabaseManager, PostgresExecutorStore, PostgresJobTokenStore};
pub use memory::{InMemoryExecutorStore, InMemoryJobTokenStore, InMemoryWorkerStore, RecordState};
pub use queued_job::{PassthroughTransformer, QueuedJob};
