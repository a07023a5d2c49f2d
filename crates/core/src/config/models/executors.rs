use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Executor-facing settings. This section can be swapped at runtime by the
/// config watcher; the auth gate reads `access_token` on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorsConfig {
    /// Shared secret for the `token-executor` scheme. Empty disables it.
    pub access_token: String,
    pub queues: Vec<String>,
    /// Hostnames registered up front in the in-memory executor directory.
    pub known_hosts: Vec<String>,
}

impl ExecutorsConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.queues.is_empty() {
            return Err(anyhow::anyhow!("至少需要配置一个队列"));
        }

        let mut seen = HashSet::new();
        for queue in &self.queues {
            if queue.is_empty() {
                return Err(anyhow::anyhow!("队列名称不能为空"));
            }
            if !queue
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(anyhow::anyhow!(
                    "队列名称只能包含字母、数字、'-' 和 '_': {queue}"
                ));
            }
            if !seen.insert(queue.as_str()) {
                return Err(anyhow::anyhow!("队列名称重复: {queue}"));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTokensConfig {
    /// Backend for job tokens and the executor directory.
    pub backend: StorageBackend,
    pub ttl_seconds: u64,
    /// 过期令牌的清理周期
    pub purge_interval_seconds: u64,
}

impl Default for JobTokensConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            ttl_seconds: 60 * 60 * 24,
            purge_interval_seconds: 60 * 5,
        }
    }
}

impl JobTokensConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ttl_seconds == 0 {
            return Err(anyhow::anyhow!("任务令牌有效期必须大于0"));
        }
        if self.purge_interval_seconds == 0 {
            return Err(anyhow::anyhow!("过期令牌清理周期必须大于0"));
        }
        Ok(())
    }
}
