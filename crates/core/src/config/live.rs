use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

/// Shared handle to a configuration section that may be replaced at runtime.
///
/// Readers take the current value on every access instead of caching it.
#[derive(Debug)]
pub struct LiveConfig<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> LiveConfig<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().await
    }

    /// Swaps in a new value and returns the previous one.
    pub async fn replace(&self, value: T) -> T {
        let mut guard = self.inner.write().await;
        std::mem::replace(&mut *guard, value)
    }
}

impl<T: Clone> LiveConfig<T> {
    pub async fn snapshot(&self) -> T {
        self.inner.read().await.clone()
    }
}

impl<T> Clone for LiveConfig<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
