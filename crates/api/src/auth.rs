//! Executor 认证中间件
//!
//! 支持两种 `Authorization` 方案：
//! - `token-executor <secret>` - 全局共享密钥，匹配后直接放行
//! - `Bearer <token>` - 任务令牌，必须属于请求声明的任务和当前队列，
//!   且 executor 主机已在目录中登记

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use executor_queue_core::{ExecutorStore, ExecutorsConfig, JobTokenStore, LiveConfig};
use serde::Deserialize;
use tracing::{debug, warn};

pub const SHARED_SECRET_SCHEME: &str = "token-executor";
pub const BEARER_SCHEME: &str = "Bearer";

/// A parsed `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    SharedSecret(String),
    Bearer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("No request body provided")]
    MissingBody,

    #[error("Failed to parse request body")]
    MalformedBody,

    #[error("worker hostname cannot be empty")]
    MissingExecutorName,

    #[error("no token value in the HTTP Authorization request header")]
    MissingToken,

    #[error("HTTP Authorization request header value must be of the following form: 'Bearer \"TOKEN\"' or 'token-executor TOKEN'")]
    MalformedHeader,

    #[error("unrecognized HTTP Authorization request header scheme (supported values: \"Bearer\", \"token-executor\")")]
    UnrecognizedScheme,

    #[error("invalid shared secret")]
    InvalidSharedSecret,

    #[error("invalid token")]
    TokenNotFound,

    #[error("invalid token")]
    TokenScopeMismatch,

    #[error("invalid token")]
    UnknownExecutor,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingBody | AuthError::MalformedBody | AuthError::MissingExecutorName => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidSharedSecret | AuthError::TokenScopeMismatch => {
                StatusCode::FORBIDDEN
            }
            AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::UnrecognizedScheme
            | AuthError::TokenNotFound
            | AuthError::UnknownExecutor => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // 共享密钥不匹配时不返回任何内容
            AuthError::InvalidSharedSecret => status.into_response(),
            other => (status, format!("{other}\n")).into_response(),
        }
    }
}

/// Parses an `Authorization` header value into one of the supported schemes.
pub fn parse_authorization_header(value: &str) -> Result<AuthScheme, AuthError> {
    if value.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::MalformedHeader);
    };

    match *scheme {
        SHARED_SECRET_SCHEME => Ok(AuthScheme::SharedSecret(token.to_string())),
        BEARER_SCHEME => Ok(AuthScheme::Bearer(token.to_string())),
        _ => Err(AuthError::UnrecognizedScheme),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimedJob {
    #[serde(default)]
    executor_name: String,
    #[serde(default)]
    job_id: i64,
}

/// Resolves and authorizes the caller of a queue operation.
#[derive(Clone)]
pub struct AuthGate {
    job_tokens: Arc<dyn JobTokenStore>,
    executors: Arc<dyn ExecutorStore>,
    executors_config: LiveConfig<ExecutorsConfig>,
}

impl AuthGate {
    pub fn new(
        job_tokens: Arc<dyn JobTokenStore>,
        executors: Arc<dyn ExecutorStore>,
        executors_config: LiveConfig<ExecutorsConfig>,
    ) -> Self {
        Self {
            job_tokens,
            executors,
            executors_config,
        }
    }

    /// 按顺序执行全部检查；通过时返回 `Ok(())`
    pub async fn authorize(
        &self,
        queue: &str,
        authorization: Option<&HeaderValue>,
        body: &[u8],
    ) -> Result<(), AuthError> {
        if body.is_empty() {
            return Err(AuthError::MissingBody);
        }
        let claimed: ClaimedJob =
            serde_json::from_slice(body).map_err(|_| AuthError::MalformedBody)?;
        if claimed.executor_name.is_empty() {
            return Err(AuthError::MissingExecutorName);
        }

        let header = match authorization {
            Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader)?,
            None => return Err(AuthError::MissingToken),
        };

        match parse_authorization_header(header)? {
            AuthScheme::SharedSecret(secret) => {
                let config = self.executors_config.read().await;
                if config.access_token.is_empty() || config.access_token != secret {
                    return Err(AuthError::InvalidSharedSecret);
                }
                Ok(())
            }
            AuthScheme::Bearer(token) => {
                self.authorize_job_token(queue, &claimed, &token).await
            }
        }
    }

    async fn authorize_job_token(
        &self,
        queue: &str,
        claimed: &ClaimedJob,
        token: &str,
    ) -> Result<(), AuthError> {
        let job_token = self.job_tokens.get_by_token(token).await.map_err(|err| {
            debug!("查找任务令牌失败: {}", err);
            AuthError::TokenNotFound
        })?;

        if !job_token.authorizes(claimed.job_id, queue) {
            return Err(AuthError::TokenScopeMismatch);
        }

        match self.executors.get_by_hostname(&claimed.executor_name).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(AuthError::UnknownExecutor),
            Err(err) => {
                debug!("查找executor失败: {}", err);
                Err(AuthError::UnknownExecutor)
            }
        }
    }
}

/// State of the auth layer mounted on one queue's routes.
#[derive(Clone)]
pub struct QueueAuthState {
    queue: Arc<str>,
    gate: AuthGate,
}

impl QueueAuthState {
    pub fn new(queue: &str, gate: AuthGate) -> Self {
        Self {
            queue: Arc::from(queue),
            gate,
        }
    }
}

/// 认证中间件
///
/// 请求体会被完整读入内存做校验，之后原样交还给下游处理器。
pub async fn auth_middleware(
    State(state): State<QueueAuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match Bytes::from_request(Request::from_parts(parts.clone(), body), &()).await {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(queue = %state.queue, "请求体超过大小限制: {}", rejection.body_text());
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
        Err(rejection) => {
            warn!(queue = %state.queue, "读取请求体失败: {}", rejection.body_text());
            return AuthError::MalformedBody.into_response();
        }
    };

    let authorization = parts.headers.get(AUTHORIZATION);
    if let Err(err) = state
        .gate
        .authorize(&state.queue, authorization, &bytes)
        .await
    {
        warn!(queue = %state.queue, reason = ?err, "Authentication failed: {}", err);
        return err.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
