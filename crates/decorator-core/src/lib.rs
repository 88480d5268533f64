pub mod error;
pub use error::{CoreError, MetadataError};

pub mod tags;
pub use tags::{normalize_tags, parse_tag};

pub mod labels;
pub use labels::{LabelChanges, apply_labels, identity_labels};

pub mod metadata;
pub use metadata::{InstanceWatcher, MetadataSource, WatcherConfig, spawn_watcher};

pub mod metrics;
pub use metrics::{MetricsHandle, ReconcileMetrics, ReconcileResult, noop_metrics};

pub mod node;
pub use node::NodeClient;

pub mod reconciler;
pub use reconciler::{ReconcileOutcome, Reconciler, ReconcilerConfig};

pub mod watch;
pub use watch::{LoopState, WatchConfig, WatchLoop};

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::error::{CoreError, MetadataError};
    pub use crate::metadata::MetadataSource;
    pub use crate::node::NodeClient;
    pub use crate::reconciler::{Reconciler, ReconcilerConfig};
    pub use crate::watch::WatchLoop;
}
