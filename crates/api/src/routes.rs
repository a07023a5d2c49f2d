use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::post, Router};
use executor_queue_core::QueueRecord;

use crate::auth::{auth_middleware, AuthGate, QueueAuthState};
use crate::handler::{dequeue, execution_log, finalize, QueueHandler};

/// Mounts one queue's operations without authentication.
pub fn queue_routes<R: QueueRecord>(handler: Arc<QueueHandler<R>>) -> Router {
    let name = handler.name().to_string();

    Router::new()
        .route(&format!("/{name}"), post(dequeue::handle_dequeue::<R>))
        .route(&format!("/{name}/"), post(dequeue::handle_dequeue::<R>))
        .route(
            &format!("/{name}/addExecutionLogEntry"),
            post(execution_log::handle_add_execution_log_entry::<R>),
        )
        .route(
            &format!("/{name}/updateExecutionLogEntry"),
            post(execution_log::handle_update_execution_log_entry::<R>),
        )
        .route(
            &format!("/{name}/markComplete"),
            post(finalize::handle_mark_complete::<R>),
        )
        .route(
            &format!("/{name}/markErrored"),
            post(finalize::handle_mark_errored::<R>),
        )
        .route(
            &format!("/{name}/markFailed"),
            post(finalize::handle_mark_failed::<R>),
        )
        .with_state(handler)
}

/// 挂载队列路由并在每个操作前执行认证
pub fn queue_router<R: QueueRecord>(handler: Arc<QueueHandler<R>>, gate: AuthGate) -> Router {
    let auth_state = QueueAuthState::new(handler.name(), gate);
    queue_routes(handler).route_layer(from_fn_with_state(auth_state, auth_middleware))
}
