use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use executor_queue_core::{Executor, ExecutorStore, ExecutorsConfig, LiveConfig, StoreResult};
use tokio::sync::RwLock;

/// 内存 executor 目录
///
/// 主机来源有两个：心跳登记的主机，以及运行期配置中的 `known_hosts`。
/// 后者在每次查找时读取，配置热更新后立即生效。
#[derive(Debug, Clone, Default)]
pub struct InMemoryExecutorStore {
    executors: Arc<RwLock<HashMap<String, Executor>>>,
    known_hosts: Option<LiveConfig<ExecutorsConfig>>,
}

impl InMemoryExecutorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hostnames<I, S>(hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let executors = hostnames
            .into_iter()
            .map(|hostname| {
                let executor = Executor::new(hostname);
                (executor.hostname.clone(), executor)
            })
            .collect();

        Self {
            executors: Arc::new(RwLock::new(executors)),
            known_hosts: None,
        }
    }

    /// 以运行期配置中的 `known_hosts` 作为预登记主机
    pub fn with_known_hosts(config: LiveConfig<ExecutorsConfig>) -> Self {
        Self {
            executors: Arc::default(),
            known_hosts: Some(config),
        }
    }

    /// 记录心跳，新主机会被加入目录
    pub async fn upsert_heartbeat(&self, mut executor: Executor) {
        executor.last_seen_at = Utc::now();
        self.executors
            .write()
            .await
            .insert(executor.hostname.clone(), executor);
    }

    async fn is_known_host(&self, hostname: &str) -> bool {
        match &self.known_hosts {
            Some(config) => config
                .read()
                .await
                .known_hosts
                .iter()
                .any(|known| known == hostname),
            None => false,
        }
    }
}

#[async_trait]
impl ExecutorStore for InMemoryExecutorStore {
    async fn get_by_hostname(&self, hostname: &str) -> StoreResult<Option<Executor>> {
        if let Some(executor) = self.executors.read().await.get(hostname) {
            return Ok(Some(executor.clone()));
        }

        if self.is_known_host(hostname).await {
            return Ok(Some(Executor::new(hostname)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_known_and_unknown_hosts() {
        let store = InMemoryExecutorStore::with_hostnames(["test-executor"]);

        let found = store.get_by_hostname("test-executor").await.unwrap();
        assert_eq!(found.map(|e| e.hostname), Some("test-executor".to_string()));
        assert!(store.get_by_hostname("stranger").await.unwrap().is_none());

        store.upsert_heartbeat(Executor::new("stranger")).await;
        assert!(store.get_by_hostname("stranger").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_known_hosts_follow_config_reload() {
        let config = LiveConfig::new(ExecutorsConfig {
            queues: vec!["test".to_string()],
            known_hosts: vec!["old-executor".to_string()],
            ..Default::default()
        });
        let store = InMemoryExecutorStore::with_known_hosts(config.clone());
        assert!(store.get_by_hostname("old-executor").await.unwrap().is_some());
        assert!(store.get_by_hostname("new-executor").await.unwrap().is_none());

        let mut reloaded = config.snapshot().await;
        reloaded.known_hosts = vec!["new-executor".to_string()];
        config.replace(reloaded).await;

        assert!(store.get_by_hostname("old-executor").await.unwrap().is_none());
        let found = store.get_by_hostname("new-executor").await.unwrap();
        assert_eq!(found.map(|e| e.hostname), Some("new-executor".to_string()));
    }

    #[tokio::test]
    async fn test_heartbeat_outlives_config_removal() {
        let config = LiveConfig::new(ExecutorsConfig {
            known_hosts: vec!["test-executor".to_string()],
            ..Default::default()
        });
        let store = InMemoryExecutorStore::with_known_hosts(config.clone());
        store.upsert_heartbeat(Executor::new("test-executor")).await;

        config.replace(ExecutorsConfig::default()).await;

        assert!(store.get_by_hostname("test-executor").await.unwrap().is_some());
    }
}
