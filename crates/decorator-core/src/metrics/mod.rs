//! Metrics abstraction for reconciliation passes.
//!
//! Backends (prometheus, etc) implement [`ReconcileMetrics`] and are handed to the
//! [`crate::Reconciler`] and [`crate::WatchLoop`] as a [`MetricsHandle`].
mod backend;
pub use backend::{MetricsHandle, ReconcileMetrics, ReconcileResult};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
