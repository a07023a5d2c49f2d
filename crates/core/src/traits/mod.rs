//! 协议层依赖的外部协作者接口
//!
//! - [`WorkerStore`] - 队列存储，负责租约和记录状态
//! - [`JobTokenStore`] - 任务令牌的签发、轮换和吊销
//! - [`ExecutorStore`] - executor 主机目录
//! - [`RecordTransformer`] - 把队列记录转换为下发的任务载荷

pub mod executor_store;
pub mod job_token_store;
pub mod transformer;
pub mod worker_store;

pub use executor_store::*;
pub use job_token_store::*;
pub use transformer::*;
pub use worker_store::*;
