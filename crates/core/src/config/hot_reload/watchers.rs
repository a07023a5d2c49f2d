use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::models::AppConfig;

/// Polls a configuration file's modification time and reloads it on change.
pub struct FileConfigWatcher {
    /// File path to watch
    file_path: PathBuf,
    /// Last modification time
    last_modified: Option<SystemTime>,
    /// Polling interval
    polling_interval: Duration,
}

impl FileConfigWatcher {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            last_modified: None,
            polling_interval: Duration::from_secs(5),
        }
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Records the file's current modification time so that only later
    /// edits count as changes.
    pub fn mark_current(&mut self) {
        self.last_modified = self.modified_time();
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.file_path)
            .and_then(|metadata| metadata.modified())
            .ok()
    }

    /// Returns the reloaded configuration if the file changed since the
    /// previous check. A changed file that fails to load or validate is
    /// reported once and not retried until it changes again.
    pub fn poll_once(&mut self) -> anyhow::Result<Option<AppConfig>> {
        let current = match self.modified_time() {
            Some(modified) => modified,
            None => return Ok(None),
        };
        if Some(current) == self.last_modified {
            return Ok(None);
        }
        self.last_modified = Some(current);

        debug!("Configuration file changed: {}", self.file_path.display());
        let path = self.file_path.to_string_lossy();
        AppConfig::load(Some(path.as_ref())).map(Some)
    }

    /// Waits until the file changes to a valid configuration.
    pub async fn wait_for_change(&mut self) -> AppConfig {
        loop {
            match self.poll_once() {
                Ok(Some(config)) => return config,
                Ok(None) => {}
                Err(e) => warn!(
                    "Ignoring invalid configuration reload from {}: {e:#}",
                    self.file_path.display()
                ),
            }

            sleep(self.polling_interval).await;
        }
    }
}
