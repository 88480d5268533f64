use std::sync::Arc;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use decorator_core::{ReconcileMetrics, ReconcileResult};

const NAMESPACE: &str = "node_decorator";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// - `outcome`: "updated", "unchanged", "failed"
/// - `kind`: "set", "removed"
#[derive(Clone)]
pub struct PrometheusMetrics {
    reconciles: IntCounterVec,
    reconcile_duration: Histogram,
    label_changes: IntCounterVec,
    watcher_errors: IntCounter,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend that registers its collectors in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let reconciles = IntCounterVec::new(
            Opts::new("reconcile_total", "Reconciliation passes by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(reconciles.clone()))?;

        let reconcile_duration = Histogram::with_opts(
            HistogramOpts::new(
                "reconcile_duration_seconds",
                "Reconciliation pass duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(reconcile_duration.clone()))?;

        let label_changes = IntCounterVec::new(
            Opts::new("label_changes_total", "Node label mutations written").namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(label_changes.clone()))?;

        let watcher_errors = IntCounter::with_opts(
            Opts::new("watcher_errors_total", "Failed instance metadata polls")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(watcher_errors.clone()))?;

        Ok(Self {
            reconciles,
            reconcile_duration,
            label_changes,
            watcher_errors,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode the registry in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl ReconcileMetrics for PrometheusMetrics {
    fn record_reconcile(&self, result: ReconcileResult, duration_ms: u64) {
        self.reconciles
            .with_label_values(&[result.as_label()])
            .inc();
        self.reconcile_duration
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_label_changes(&self, set: usize, removed: usize) {
        self.label_changes
            .with_label_values(&["set"])
            .inc_by(set as u64);
        self.label_changes
            .with_label_values(&["removed"])
            .inc_by(removed as u64);
    }

    fn record_watcher_error(&self) {
        self.watcher_errors.inc();
    }
}
