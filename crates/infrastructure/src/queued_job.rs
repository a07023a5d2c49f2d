use async_trait::async_trait;
use executor_queue_core::{
    ClientVersion, Job, QueueRecord, RecordTransformer, ResourceMetadata,
};
use serde::{Deserialize, Serialize};

/// A queue record that carries its prebuilt job payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: i64,
    pub template: Job,
}

impl QueuedJob {
    pub fn new(id: i64, template: Job) -> Self {
        Self { id, template }
    }
}

impl QueueRecord for QueuedJob {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// Hands out a [`QueuedJob`]'s template unchanged apart from its id.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTransformer;

#[async_trait]
impl RecordTransformer<QueuedJob> for PassthroughTransformer {
    async fn transform(
        &self,
        _version: &ClientVersion,
        record: &QueuedJob,
        _resources: &ResourceMetadata,
    ) -> anyhow::Result<Job> {
        let has_docker_steps = record
            .template
            .docker_steps
            .as_ref()
            .is_some_and(|steps| !steps.is_empty());
        let has_cli_steps = record
            .template
            .cli_steps
            .as_ref()
            .is_some_and(|steps| !steps.is_empty());
        if !has_docker_steps && !has_cli_steps {
            return Err(anyhow::anyhow!("job {} has no steps", record.id));
        }

        let mut job = record.template.clone();
        job.id = record.id;
        job.token.clear();
        Ok(job)
    }
}
