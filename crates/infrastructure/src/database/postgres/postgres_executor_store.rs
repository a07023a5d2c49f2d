use async_trait::async_trait;
use executor_queue_core::{Executor, ExecutorStore, StoreError, StoreResult};
use sqlx::{PgPool, Row};
use tracing::debug;

/// PostgreSQL executor 目录
pub struct PostgresExecutorStore {
    pool: PgPool,
}

impl PostgresExecutorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_executor(row: &sqlx::postgres::PgRow) -> StoreResult<Executor> {
        Ok(Executor {
            hostname: row.try_get("hostname")?,
            queue_name: row.try_get("queue_name")?,
            executor_version: row.try_get("executor_version")?,
            last_seen_at: row.try_get("last_seen_at")?,
        })
    }

    /// 记录心跳
    pub async fn upsert_heartbeat(&self, executor: &Executor) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO executor_heartbeats (hostname, queue_name, executor_version, last_seen_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (hostname) DO UPDATE SET
                queue_name = EXCLUDED.queue_name,
                executor_version = EXCLUDED.executor_version,
                last_seen_at = NOW()
            "#,
        )
        .bind(&executor.hostname)
        .bind(&executor.queue_name)
        .bind(&executor.executor_version)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        debug!("记录executor心跳: {}", executor.hostname);
        Ok(())
    }
}

#[async_trait]
impl ExecutorStore for PostgresExecutorStore {
    async fn get_by_hostname(&self, hostname: &str) -> StoreResult<Option<Executor>> {
        let row = sqlx::query(
            "SELECT hostname, queue_name, executor_version, last_seen_at FROM executor_heartbeats WHERE hostname = $1",
        )
        .bind(hostname)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        row.as_ref().map(Self::row_to_executor).transpose()
    }
}
