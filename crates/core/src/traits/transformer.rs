use async_trait::async_trait;

use crate::models::{Job, ResourceMetadata};
use crate::traits::QueueRecord;
use crate::version::ClientVersion;

/// Maps a leased queue record into the job payload sent to the executor.
///
/// The returned job's `token` is overwritten by the caller once a job token
/// has been minted.
#[async_trait]
pub trait RecordTransformer<R: QueueRecord>: Send + Sync {
    async fn transform(
        &self,
        version: &ClientVersion,
        record: &R,
        resources: &ResourceMetadata,
    ) -> anyhow::Result<Job>;
}
