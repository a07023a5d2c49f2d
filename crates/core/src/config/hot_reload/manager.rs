use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::{
    hot_reload::watchers::FileConfigWatcher,
    live::LiveConfig,
    models::{AppConfig, ExecutorsConfig},
};

/// Applies configuration file edits to the live executor section.
pub struct HotReloadManager {
    watcher: FileConfigWatcher,
    executors: LiveConfig<ExecutorsConfig>,
}

impl HotReloadManager {
    pub fn new(watcher: FileConfigWatcher, executors: LiveConfig<ExecutorsConfig>) -> Self {
        Self { watcher, executors }
    }

    /// Swaps in the executor section of a freshly loaded configuration.
    /// Returns whether anything changed.
    pub async fn apply(&self, config: AppConfig) -> bool {
        let next = config.executors;
        let previous = self.executors.snapshot().await;
        if previous == next {
            return false;
        }

        if previous.queues != next.queues {
            warn!(
                "Queue list changed from {:?} to {:?}; routes are only rebuilt on restart",
                previous.queues, next.queues
            );
        }
        if previous.known_hosts != next.known_hosts {
            info!(
                "Known executor hosts changed from {:?} to {:?}; the in-memory directory applies this immediately, a PostgreSQL directory keeps the hosts registered at startup",
                previous.known_hosts, next.known_hosts
            );
        }
        if previous.access_token != next.access_token {
            info!("Executor access token rotated");
        }

        self.executors.replace(next).await;
        true
    }

    /// Runs until a shutdown signal arrives.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "Watching configuration file for changes: {}",
            self.watcher.path().display()
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Configuration watcher stopped");
                    break;
                }
                config = self.watcher.wait_for_change() => {
                    self.apply(config).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: &str) -> AppConfig {
        AppConfig {
            executors: ExecutorsConfig {
                access_token: token.to_string(),
                queues: vec!["test".to_string()],
                known_hosts: vec![],
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_rotates_access_token() {
        let live = LiveConfig::new(config("old").executors);
        let manager = HotReloadManager::new(FileConfigWatcher::new("unused.toml"), live.clone());

        assert!(manager.apply(config("new")).await);
        assert_eq!(live.read().await.access_token, "new");

        assert!(!manager.apply(config("new")).await);
    }

    #[tokio::test]
    async fn test_apply_swaps_known_hosts() {
        let live = LiveConfig::new(config("token").executors);
        let manager = HotReloadManager::new(FileConfigWatcher::new("unused.toml"), live.clone());

        let mut next = config("token");
        next.executors.known_hosts = vec!["new-executor".to_string()];

        assert!(manager.apply(next).await);
        assert_eq!(live.read().await.known_hosts, vec!["new-executor".to_string()]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let live = LiveConfig::new(config("old").executors);
        let manager = HotReloadManager::new(
            FileConfigWatcher::new("/nonexistent/executor-queue.toml"),
            live,
        );
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(manager.run(rx));
        tx.send(()).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
