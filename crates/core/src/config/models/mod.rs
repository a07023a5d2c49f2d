pub mod api_observability;
pub mod app_config;
pub mod database;
pub mod executors;

pub use api_observability::{ApiConfig, HotReloadConfig, LoggingConfig};
pub use app_config::AppConfig;
pub use database::DatabaseConfig;
pub use executors::{ExecutorsConfig, JobTokensConfig, StorageBackend};
