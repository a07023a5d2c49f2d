//! # 数据模型
//!
//! executor 队列协议中流转的数据结构：
//!
//! - [`Job`] / [`VersionedJob`] - 出队时下发给 executor 的任务载荷
//! - [`JobToken`] - 任务令牌授权的 (任务, 队列) 组合
//! - [`ExecutionLogEntry`] - 执行过程中上报的日志条目
//! - [`Executor`] - 已知的 executor 主机
//! - [`ResourceMetadata`] - executor 上报的资源信息
//!
//! 队列记录本身对协议层不透明，只通过 [`crate::traits::QueueRecord`] 暴露 ID。

pub mod execution_log;
pub mod executor;
pub mod job;
pub mod job_token;
pub mod resources;

pub use execution_log::*;
pub use executor::*;
pub use job::*;
pub use job_token::*;
pub use resources::*;
