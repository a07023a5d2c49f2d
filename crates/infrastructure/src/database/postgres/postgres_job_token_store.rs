use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use executor_queue_core::{JobToken, JobTokenStore, StoreError, StoreResult};
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::token::{generate_secret, hash_secret};

/// PostgreSQL任务令牌存储
pub struct PostgresJobTokenStore {
    pool: PgPool,
    ttl: chrono::Duration,
}

impl PostgresJobTokenStore {
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    fn expires_at(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[async_trait]
impl JobTokenStore for PostgresJobTokenStore {
    /// 已过期的旧令牌会被原地替换，未过期的旧令牌视为冲突
    async fn create(&self, job_id: i64, queue: &str) -> StoreResult<String> {
        let secret = generate_secret();

        let result = sqlx::query(
            r#"
            INSERT INTO executor_job_tokens (value_sha256, job_id, queue, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (job_id, queue) DO UPDATE SET
                value_sha256 = EXCLUDED.value_sha256,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW()
            WHERE executor_job_tokens.expires_at <= NOW()
            "#,
        )
        .bind(hash_secret(&secret))
        .bind(job_id)
        .bind(queue)
        .bind(self.expires_at())
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::JobTokenAlreadyExists);
        }

        debug!("创建任务令牌: job_id={}, queue={}", job_id, queue);
        Ok(secret)
    }

    async fn exists(&self, job_id: i64, queue: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM executor_job_tokens WHERE job_id = $1 AND queue = $2 AND expires_at > NOW()) AS present",
        )
        .bind(job_id)
        .bind(queue)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        Ok(row.try_get("present")?)
    }

    async fn regenerate(&self, job_id: i64, queue: &str) -> StoreResult<String> {
        let secret = generate_secret();

        sqlx::query(
            r#"
            INSERT INTO executor_job_tokens (value_sha256, job_id, queue, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (job_id, queue) DO UPDATE SET
                value_sha256 = EXCLUDED.value_sha256,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW()
            "#,
        )
        .bind(hash_secret(&secret))
        .bind(job_id)
        .bind(queue)
        .bind(self.expires_at())
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        debug!("重新生成任务令牌: job_id={}, queue={}", job_id, queue);
        Ok(secret)
    }

    async fn delete(&self, job_id: i64, queue: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM executor_job_tokens WHERE job_id = $1 AND queue = $2")
            .bind(job_id)
            .bind(queue)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> StoreResult<JobToken> {
        let row = sqlx::query(
            "SELECT job_id, queue FROM executor_job_tokens WHERE value_sha256 = $1 AND expires_at > NOW()",
        )
        .bind(hash_secret(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        match row {
            Some(row) => Ok(JobToken {
                job_id: row.try_get("job_id")?,
                queue: row.try_get("queue")?,
            }),
            None => Err(StoreError::JobTokenNotFound),
        }
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM executor_job_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        Ok(result.rows_affected())
    }
}
