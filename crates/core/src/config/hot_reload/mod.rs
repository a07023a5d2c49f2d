pub mod manager;
pub mod watchers;

// Re-export main types for easier imports
pub use manager::HotReloadManager;
pub use watchers::FileConfigWatcher;
