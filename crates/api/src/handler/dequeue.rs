use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use executor_queue_core::{
    ClientVersion, MarkFinalOptions, QueueError, QueueRecord, QueueResult, VersionedJob,
};
use tracing::{debug, info, warn};

use super::{ops, QueueHandler};
use crate::error::ApiResult;
use crate::requests::{decode, DequeueRequest};

impl<R: QueueRecord> QueueHandler<R> {
    /// 为 executor 租出一条记录并签发任务令牌
    ///
    /// 没有可用记录时返回 `None`。版本号在访问存储之前校验。
    pub async fn dequeue(&self, request: &DequeueRequest) -> QueueResult<Option<VersionedJob>> {
        let version = ClientVersion::parse(&request.version)?;

        let record = match self
            .worker_store
            .dequeue(&request.executor_name, &[])
            .await
        {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(err) => return Err(QueueError::op(ops::DEQUEUE, err)),
        };
        let id = record.record_id();

        let mut job = match self
            .record_transformer
            .transform(&version, &record, &request.resources)
            .await
        {
            Ok(job) => job,
            Err(err) => return Err(self.fail_untransformable(id, err).await),
        };

        job.token = self.mint_job_token(id).await?;

        info!(
            queue = %self.name,
            executor = %request.executor_name,
            job_id = id,
            "任务已出队"
        );
        Ok(Some(VersionedJob::new(version.wire_format(), job)))
    }

    /// 转换失败的记录直接标记为失败，避免租约悬空
    async fn fail_untransformable(&self, id: i64, cause: anyhow::Error) -> QueueError {
        let message = format!("failed to transform record: {cause}");
        warn!(queue = %self.name, job_id = id, "{}", message);

        let transform_err = QueueError::Transform(cause);
        match self
            .worker_store
            .mark_failed(id, &message, &MarkFinalOptions::default())
            .await
        {
            Ok(_) => transform_err,
            Err(err) => transform_err.append(QueueError::op(ops::MARK_FAILED, err)),
        }
    }

    async fn mint_job_token(&self, job_id: i64) -> QueueResult<String> {
        let create_err = match self.job_tokens.create(job_id, &self.name).await {
            Ok(token) => return Ok(token),
            Err(err) => err,
        };

        match self.job_tokens.exists(job_id, &self.name).await {
            Err(exists_err) => Err(QueueError::op(ops::CREATE_TOKEN, create_err)
                .append(QueueError::op(ops::EXISTS, exists_err))),
            Ok(false) => Err(QueueError::op(ops::CREATE_TOKEN, create_err)),
            Ok(true) => {
                debug!(queue = %self.name, job_id, "任务令牌已存在，重新生成");
                self.job_tokens
                    .regenerate(job_id, &self.name)
                    .await
                    .map_err(|err| QueueError::op(ops::REGENERATE, err))
            }
        }
    }
}

/// POST /{queue} 和 /{queue}/
pub async fn handle_dequeue<R: QueueRecord>(
    State(handler): State<Arc<QueueHandler<R>>>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: DequeueRequest = decode(&body)?;

    match handler.dequeue(&request).await? {
        Some(job) => Ok((StatusCode::OK, Json(job)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
