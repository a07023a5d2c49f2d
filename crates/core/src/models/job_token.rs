use serde::{Deserialize, Serialize};

/// The (job, queue) pair a job token authorizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobToken {
    pub job_id: i64,
    pub queue: String,
}

impl JobToken {
    pub fn new(job_id: i64, queue: impl Into<String>) -> Self {
        Self {
            job_id,
            queue: queue.into(),
        }
    }

    /// 令牌是否属于给定的任务和队列
    pub fn authorizes(&self, job_id: i64, queue: &str) -> bool {
        self.job_id == job_id && self.queue == queue
    }
}
