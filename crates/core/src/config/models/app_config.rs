use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, HotReloadConfig, LoggingConfig},
    database::DatabaseConfig,
    executors::{ExecutorsConfig, JobTokensConfig, StorageBackend},
};

/// Environment variable prefix, e.g. `EXECUTOR_QUEUE_EXECUTORS__ACCESS_TOKEN`.
pub const ENV_PREFIX: &str = "EXECUTOR_QUEUE";

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub executors: ExecutorsConfig,
    pub job_tokens: JobTokensConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub hot_reload: HotReloadConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: EXECUTOR_QUEUE_, nested keys joined by `__`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else {
            let default_paths = ["config/executor-queue.toml", "executor-queue.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("executors.queues")
                .with_list_parse_key("executors.known_hosts"),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = ConfigBuilder::builder()
            .add_source(File::from_str(toml_str, FileFormat::Toml))
            .build()
            .context("解析TOML配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.api.validate().context("API配置验证失败")?;

        self.executors
            .validate()
            .context("Executor配置验证失败")?;

        self.job_tokens
            .validate()
            .context("任务令牌配置验证失败")?;

        if self.job_tokens.backend == StorageBackend::Postgres {
            self.database.validate().context("数据库配置验证失败")?;
        }

        self.logging.validate().context("日志配置验证失败")?;

        self.hot_reload.validate().context("热重载配置验证失败")?;

        Ok(())
    }
}
