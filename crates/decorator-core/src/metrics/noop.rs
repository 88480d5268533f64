use crate::metrics::backend::{ReconcileMetrics, ReconcileResult};

/// Metrics backend that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl ReconcileMetrics for NoOpMetrics {
    #[inline(always)]
    fn record_reconcile(&self, _: ReconcileResult, _: u64) {}

    #[inline(always)]
    fn record_label_changes(&self, _: usize, _: usize) {}

    #[inline(always)]
    fn record_watcher_error(&self) {}
}
