use std::sync::Arc;
use std::time::Duration;

use executor_queue_core::{JobTokenStore, StoreResult};
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, error, info};

/// 过期任务令牌清理服务
///
/// executor 异常退出时任务不会被终结，其令牌只能等过期后由这里删除。
pub struct TokenCleanupService {
    job_tokens: Arc<dyn JobTokenStore>,
    interval: Duration,
}

impl TokenCleanupService {
    pub fn new(job_tokens: Arc<dyn JobTokenStore>, interval: Duration) -> Self {
        Self {
            job_tokens,
            interval,
        }
    }

    /// 执行一次清理
    pub async fn cleanup_once(&self) -> StoreResult<u64> {
        let purged = self.job_tokens.purge_expired().await?;
        if purged > 0 {
            info!("已清理 {} 个过期任务令牌", purged);
        } else {
            debug!("没有需要清理的过期任务令牌");
        }
        Ok(purged)
    }

    /// 按固定周期清理，直到收到关闭信号
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("任务令牌清理服务启动，周期: {:?}", self.interval);
        let mut ticker = interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("任务令牌清理服务停止");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.cleanup_once().await {
                        error!("清理过期任务令牌失败: {}", e);
                    }
                }
            }
        }
    }
}
