//! Instance metadata seam and the polling watcher built on it.
mod watcher;
pub use watcher::{InstanceWatcher, WatcherConfig, spawn_watcher};

use async_trait::async_trait;

use crate::error::MetadataError;
use decorator_model::InstanceData;

/// Source of instance metadata (the cloud metadata service in production).
#[async_trait]
pub trait MetadataSource: Send + Sync + 'static {
    /// Fetch the current instance document.
    async fn get_instance(&self) -> Result<InstanceData, MetadataError>;
}
