use std::sync::Arc;

/// Result of one reconciliation pass, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileResult {
    /// Labels changed and the node was written back.
    Updated,
    /// Node already matched; no write issued.
    Unchanged,
    /// Pass failed before completing.
    Failed,
}

impl ReconcileResult {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ReconcileResult::Updated => "updated",
            ReconcileResult::Unchanged => "unchanged",
            ReconcileResult::Failed => "failed",
        }
    }
}

/// Backend metrics collection interface.
pub trait ReconcileMetrics: Send + Sync + 'static {
    /// Record a finished pass with its result and wall time.
    fn record_reconcile(&self, result: ReconcileResult, duration_ms: u64);

    /// Record label mutations written by an updating pass.
    ///
    /// # Arguments
    /// - `set`: labels added or changed
    /// - `removed`: stale tag labels deleted
    fn record_label_changes(&self, set: usize, removed: usize);

    /// Record an error reported by the metadata watcher.
    fn record_watcher_error(&self);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn ReconcileMetrics>;
