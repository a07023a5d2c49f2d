use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::models::JobToken;

/// Issues and verifies short-lived secrets scoped to one (job, queue) pair.
#[async_trait]
pub trait JobTokenStore: Send + Sync {
    /// Mints a token. Fails with `StoreError::JobTokenAlreadyExists` while an
    /// unexpired token for the pair is still live.
    async fn create(&self, job_id: i64, queue: &str) -> StoreResult<String>;

    async fn exists(&self, job_id: i64, queue: &str) -> StoreResult<bool>;

    /// Replaces any existing token for the pair with a fresh one.
    async fn regenerate(&self, job_id: i64, queue: &str) -> StoreResult<String>;

    /// Revokes the token. Deleting a missing token succeeds.
    async fn delete(&self, job_id: i64, queue: &str) -> StoreResult<()>;

    /// Resolves a secret. Unknown or expired secrets yield
    /// `StoreError::JobTokenNotFound`.
    async fn get_by_token(&self, token: &str) -> StoreResult<JobToken>;

    /// 删除已过期的令牌，返回删除数量
    async fn purge_expired(&self) -> StoreResult<u64>;
}
