//! Prometheus metrics backend for the node decorator.
//!
//! [`PrometheusMetrics`] implements [`decorator_core::ReconcileMetrics`];
//! [`serve_metrics`] exposes its registry in text format on `GET /metrics`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use decorator_core::{MetricsHandle, ReconcileMetrics, ReconcileResult};
//! use decorator_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: MetricsHandle = Arc::new(metrics.clone());
//!
//! handle.record_reconcile(ReconcileResult::Updated, 120);
//! assert!(metrics.render()?.contains("node_decorator_reconcile_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `node_decorator_reconcile_total{outcome}` - Counter
//! - `node_decorator_reconcile_duration_seconds` - Histogram
//! - `node_decorator_label_changes_total{kind}` - Counter
//! - `node_decorator_watcher_errors_total` - Counter

mod backend;
pub use backend::PrometheusMetrics;

mod http;
pub use http::{metrics_router, serve_metrics};

pub use prometheus::{Encoder, Registry, TextEncoder};
