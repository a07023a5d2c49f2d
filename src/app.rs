use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use executor_queue_api::{create_app, queue_router, AuthGate, QueueHandler};
use executor_queue_core::{
    config::{FileConfigWatcher, HotReloadManager, StorageBackend},
    AppConfig, Executor, ExecutorStore, ExecutorsConfig, JobTokenStore, LiveConfig,
};
use executor_queue_infrastructure::{
    DatabaseManager, InMemoryExecutorStore, InMemoryJobTokenStore, InMemoryWorkerStore,
    PassthroughTransformer, PostgresExecutorStore, PostgresJobTokenStore, QueuedJob,
    TokenCleanupService,
};
use tokio::{net::TcpListener, sync::broadcast, task::JoinHandle};
use tracing::{info, warn};

/// 任务令牌存储和 executor 目录
struct Collaborators {
    job_tokens: Arc<dyn JobTokenStore>,
    executors: Arc<dyn ExecutorStore>,
    database: Option<DatabaseManager>,
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    config_path: Option<PathBuf>,
    executors_config: LiveConfig<ExecutorsConfig>,
    queues: BTreeMap<String, Arc<InMemoryWorkerStore<QueuedJob>>>,
    router: Router,
    job_tokens: Arc<dyn JobTokenStore>,
    database: Option<DatabaseManager>,
}

impl Application {
    /// 按配置创建协作者并组装所有队列路由
    pub async fn new(config: AppConfig, config_path: Option<PathBuf>) -> Result<Self> {
        info!(
            "初始化应用程序，队列: {:?}，存储后端: {:?}",
            config.executors.queues, config.job_tokens.backend
        );

        let executors_config = LiveConfig::new(config.executors.clone());
        let collaborators = create_collaborators(&config, &executors_config).await?;
        let gate = AuthGate::new(
            Arc::clone(&collaborators.job_tokens),
            Arc::clone(&collaborators.executors),
            executors_config.clone(),
        );

        let mut queues = BTreeMap::new();
        let mut routers = Vec::with_capacity(config.executors.queues.len());
        for name in &config.executors.queues {
            let store = Arc::new(InMemoryWorkerStore::<QueuedJob>::new());
            let handler = Arc::new(QueueHandler::new(
                name.clone(),
                store.clone(),
                Arc::new(PassthroughTransformer),
                Arc::clone(&collaborators.job_tokens),
            ));
            routers.push(queue_router(handler, gate.clone()));
            queues.insert(name.clone(), store);
        }

        let router = create_app(routers, &config.api);

        Ok(Self {
            config,
            config_path,
            executors_config,
            queues,
            router,
            job_tokens: collaborators.job_tokens,
            database: collaborators.database,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 指定队列的内存存储，用于投递任务
    pub fn queue(&self, name: &str) -> Option<Arc<InMemoryWorkerStore<QueuedJob>>> {
        self.queues.get(name).cloned()
    }

    pub fn executors_config(&self) -> LiveConfig<ExecutorsConfig> {
        self.executors_config.clone()
    }

    /// 启动HTTP服务，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let watcher_handle = self.spawn_config_watcher(shutdown_rx.resubscribe());
        let cleanup_handle = self.spawn_token_cleanup(shutdown_rx.resubscribe());

        let bind_address = &self.config.api.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;
        info!("API服务器启动在 http://{}", bind_address);

        axum::serve(listener, self.router.clone().into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        if let Some(handle) = watcher_handle {
            let _ = handle.await;
        }
        let _ = cleanup_handle.await;
        if let Some(database) = &self.database {
            database.close().await;
        }

        info!("API服务器已停止");
        Ok(())
    }

    fn spawn_token_cleanup(&self, shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let service = TokenCleanupService::new(
            Arc::clone(&self.job_tokens),
            Duration::from_secs(self.config.job_tokens.purge_interval_seconds),
        );
        tokio::spawn(service.run(shutdown_rx))
    }

    fn spawn_config_watcher(
        &self,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Option<JoinHandle<()>> {
        if !self.config.hot_reload.enabled {
            return None;
        }
        let Some(path) = self.config_path.clone() else {
            warn!("未指定配置文件路径，配置热更新已禁用");
            return None;
        };

        let mut watcher = FileConfigWatcher::new(path).with_polling_interval(Duration::from_secs(
            self.config.hot_reload.poll_interval_seconds,
        ));
        watcher.mark_current();

        let manager = HotReloadManager::new(watcher, self.executors_config.clone());
        Some(tokio::spawn(manager.run(shutdown_rx)))
    }
}

async fn create_collaborators(
    config: &AppConfig,
    executors_config: &LiveConfig<ExecutorsConfig>,
) -> Result<Collaborators> {
    let ttl = Duration::from_secs(config.job_tokens.ttl_seconds);
    let known_hosts = &config.executors.known_hosts;

    match config.job_tokens.backend {
        StorageBackend::Memory => Ok(Collaborators {
            job_tokens: Arc::new(InMemoryJobTokenStore::new(ttl)),
            executors: Arc::new(InMemoryExecutorStore::with_known_hosts(executors_config.clone())),
            database: None,
        }),
        StorageBackend::Postgres => {
            let database = DatabaseManager::new(&config.database).await?;
            database.migrate().await?;
            info!("数据库迁移完成");

            let executors = PostgresExecutorStore::new(database.pool().clone());
            for hostname in known_hosts {
                executors
                    .upsert_heartbeat(&Executor::new(hostname.clone()))
                    .await
                    .with_context(|| format!("登记executor失败: {hostname}"))?;
            }

            Ok(Collaborators {
                job_tokens: Arc::new(PostgresJobTokenStore::new(database.pool().clone(), ttl)),
                executors: Arc::new(executors),
                database: Some(database),
            })
        }
    }
}
