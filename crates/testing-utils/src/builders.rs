//! Test data builders for creating test entities
//!
//! This module provides builder patterns for creating test data with
//! sensible defaults and easy customization.

use chrono::{DateTime, TimeZone, Utc};
use executor_queue_core::{ExecutionLogEntry, Job};

/// Builder for creating test ExecutionLogEntry values
pub struct ExecutionLogEntryBuilder {
    entry: ExecutionLogEntry,
}

impl ExecutionLogEntryBuilder {
    pub fn new() -> Self {
        Self {
            entry: ExecutionLogEntry {
                key: "foo".to_string(),
                command: vec!["faz".to_string(), "baz".to_string()],
                start_time: fixed_start_time(),
                exit_code: Some(0),
                out: "done".to_string(),
                duration_ms: Some(100),
            },
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.entry.key = key.to_string();
        self
    }

    pub fn with_command(mut self, command: &[&str]) -> Self {
        self.entry.command = command.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.entry.exit_code = exit_code;
        self
    }

    pub fn with_out(mut self, out: &str) -> Self {
        self.entry.out = out.to_string();
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: Option<i64>) -> Self {
        self.entry.duration_ms = duration_ms;
        self
    }

    pub fn build(self) -> ExecutionLogEntry {
        self.entry
    }
}

impl Default for ExecutionLogEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Job payloads
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            job: Job {
                id,
                ..Default::default()
            },
        }
    }

    pub fn with_repository(mut self, name: &str, commit: &str) -> Self {
        self.job.repository_name = name.to_string();
        self.job.commit = commit.to_string();
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.job.token = token.to_string();
        self
    }

    pub fn with_sparse_checkout(mut self, paths: &[&str]) -> Self {
        self.job.sparse_checkout = Some(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

/// Start time used by log entry fixtures, second precision so it survives
/// an RFC 3339 round trip unchanged.
pub fn fixed_start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
        .single()
        .unwrap_or_default()
}
