use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use executor_queue_core::{JobToken, JobTokenStore, StoreError, StoreResult};
use tokio::sync::RwLock;
use tracing::debug;

use crate::token::{generate_secret, hash_secret};

type TokenKey = (i64, String);

#[derive(Debug)]
struct StoredToken {
    hash: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct TokenTable {
    by_job: HashMap<TokenKey, StoredToken>,
    by_hash: HashMap<String, TokenKey>,
}

impl TokenTable {
    fn live(&self, key: &TokenKey, now: DateTime<Utc>) -> Option<&StoredToken> {
        self.by_job.get(key).filter(|token| token.expires_at > now)
    }

    fn remove(&mut self, key: &TokenKey) {
        if let Some(old) = self.by_job.remove(key) {
            self.by_hash.remove(&old.hash);
        }
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.by_job.len();
        let by_hash = &mut self.by_hash;
        self.by_job.retain(|_, token| {
            let live = token.expires_at > now;
            if !live {
                by_hash.remove(&token.hash);
            }
            live
        });
        before - self.by_job.len()
    }

    fn issue(&mut self, key: TokenKey, expires_at: DateTime<Utc>) -> String {
        self.remove(&key);

        let secret = generate_secret();
        let hash = hash_secret(&secret);
        self.by_hash.insert(hash.clone(), key.clone());
        self.by_job.insert(key, StoredToken { hash, expires_at });
        secret
    }
}

/// 内存任务令牌存储
///
/// 以 (job_id, queue) 为键保存令牌摘要，过期令牌视为不存在。
#[derive(Debug, Clone)]
pub struct InMemoryJobTokenStore {
    ttl: chrono::Duration,
    tokens: Arc<RwLock<TokenTable>>,
}

impl InMemoryJobTokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            tokens: Arc::new(RwLock::new(TokenTable::default())),
        }
    }

    fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// 当前保存的令牌数量（含尚未清理的过期令牌）
    pub async fn len(&self) -> usize {
        self.tokens.read().await.by_job.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl JobTokenStore for InMemoryJobTokenStore {
    async fn create(&self, job_id: i64, queue: &str) -> StoreResult<String> {
        let now = Utc::now();
        let key = (job_id, queue.to_string());
        let mut tokens = self.tokens.write().await;
        tokens.purge_expired(now);

        if tokens.live(&key, now).is_some() {
            return Err(StoreError::JobTokenAlreadyExists);
        }

        let secret = tokens.issue(key, self.expires_at(now));
        debug!("创建任务令牌: job_id={}, queue={}", job_id, queue);
        Ok(secret)
    }

    async fn exists(&self, job_id: i64, queue: &str) -> StoreResult<bool> {
        let tokens = self.tokens.read().await;
        Ok(tokens.live(&(job_id, queue.to_string()), Utc::now()).is_some())
    }

    async fn regenerate(&self, job_id: i64, queue: &str) -> StoreResult<String> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        tokens.purge_expired(now);

        let secret = tokens.issue((job_id, queue.to_string()), self.expires_at(now));
        debug!("重新生成任务令牌: job_id={}, queue={}", job_id, queue);
        Ok(secret)
    }

    async fn delete(&self, job_id: i64, queue: &str) -> StoreResult<()> {
        let mut tokens = self.tokens.write().await;
        tokens.remove(&(job_id, queue.to_string()));
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> StoreResult<JobToken> {
        let tokens = self.tokens.read().await;
        let key = tokens
            .by_hash
            .get(&hash_secret(token))
            .ok_or(StoreError::JobTokenNotFound)?;

        tokens
            .live(key, Utc::now())
            .map(|_| JobToken::new(key.0, key.1.clone()))
            .ok_or(StoreError::JobTokenNotFound)
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let purged = self.tokens.write().await.purge_expired(Utc::now());
        if purged > 0 {
            debug!("清理过期任务令牌: {} 个", purged);
        }
        Ok(purged as u64)
    }
}
