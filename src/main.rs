use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use executor_queue::app::Application;
use executor_queue::shutdown::{wait_for_shutdown_signal, ShutdownSignal};
use executor_queue_core::{init_logging, AppConfig};
use tracing::{error, info, warn};

/// Executor 任务队列服务
#[derive(Debug, Parser)]
#[command(name = "executor-queue", version, about = "Executor 任务队列协调服务")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, value_name = "FILE", default_value = "config/executor-queue.toml")]
    config: PathBuf,

    /// 日志级别，默认使用配置文件中的值
    #[arg(short = 'l', long, value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// 日志格式，默认使用配置文件中的值
    #[arg(long, value_name = "FORMAT", value_parser = ["json", "pretty", "compact"])]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.to_string_lossy().into_owned();
    let config = AppConfig::load(Some(config_path.as_str()))
        .with_context(|| format!("加载配置文件失败: {config_path}"))?;

    let log_level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    init_logging(log_level, log_format)?;

    info!("启动 executor 任务队列服务");
    info!("配置文件: {config_path}");

    let app = Arc::new(Application::new(config, Some(cli.config.clone())).await?);
    let shutdown = ShutdownSignal::new();

    let app_handle = {
        let shutdown_rx = shutdown.subscribe().await;
        let app = Arc::clone(&app);

        tokio::spawn(async move {
            if let Err(e) = app.run(shutdown_rx).await {
                error!("应用运行失败: {e:#}");
            }
        })
    };

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");
    shutdown.trigger().await;

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => error!("应用关闭时发生错误: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("executor 任务队列服务已退出");
    Ok(())
}
