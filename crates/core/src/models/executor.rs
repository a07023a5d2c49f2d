use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已知的 executor 主机
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    pub hostname: String,
    pub queue_name: Option<String>,
    pub executor_version: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

impl Executor {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            queue_name: None,
            executor_version: None,
            last_seen_at: Utc::now(),
        }
    }
}
