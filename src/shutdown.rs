use std::sync::Arc;

use tokio::signal;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

/// 进程级关闭信号
///
/// HTTP 服务、配置监听和令牌清理任务各持有一个接收端。
/// 信号只会发出一次，之后订阅得到的接收端立即就绪。
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<Mutex<Option<broadcast::Sender<()>>>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<()> {
        match self.sender.lock().await.as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(1);
                let _ = sender.send(());
                receiver
            }
        }
    }

    /// 发出关闭信号，重复调用时返回 false
    pub async fn trigger(&self) -> bool {
        let Some(sender) = self.sender.lock().await.take() else {
            debug!("关闭信号已经发出过");
            return false;
        };

        // 没有接收端时 send 返回错误，忽略即可
        let receivers = sender.send(()).unwrap_or(0);
        info!("已通知 {} 个后台任务停止", receivers);
        true
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// 等待 Ctrl+C 或 SIGTERM
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
