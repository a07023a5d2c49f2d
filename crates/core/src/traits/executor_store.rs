use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::models::Executor;

/// Executor 目录查询
#[async_trait]
pub trait ExecutorStore: Send + Sync {
    async fn get_by_hostname(&self, hostname: &str) -> StoreResult<Option<Executor>>;
}
