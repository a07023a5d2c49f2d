//! 配置管理
//!
//! - **models**: 配置数据模型，`AppConfig::load` 按 默认值 → TOML 文件 → 环境变量 的顺序合并
//! - **live**: 运行期可替换的配置句柄
//! - **hot_reload**: 轮询配置文件修改时间，变更后替换 executor 配置段
//!
//! 认证相关的共享密钥位于 `executors` 配置段，通过 [`LiveConfig`] 在每个请求中读取，
//! 因此轮换密钥不需要重启服务。

pub mod hot_reload;
pub mod live;
pub mod models;

pub use hot_reload::{FileConfigWatcher, HotReloadManager};
pub use live::LiveConfig;
pub use models::*;
