//! One reconciliation pass: fetch the node, compute desired labels, write back if needed.
use std::time::Duration;

use k8s_openapi::api::core::v1::Node;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    error::CoreError,
    labels::{LabelChanges, apply_labels, identity_labels},
    metrics::{MetricsHandle, ReconcileResult, noop_metrics},
    node::NodeClient,
    tags::normalize_tags,
};
use decorator_model::{InstanceData, LabelPrefix};

/// Settings of the reconciler, validated once at construction.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    node_name: String,
    prefix: LabelPrefix,
    tags_prefix: LabelPrefix,
    timeout: Duration,
}

impl ReconcilerConfig {
    /// Build a config for `node_name`.
    ///
    /// # Arguments
    /// - `node_name`: name of the Node object to decorate
    /// - `prefix`: prefix of the identity labels (e.g. `decorator.example.com`)
    /// - `tags_prefix`: full prefix of tag labels (e.g. `tags.decorator.example.com`),
    ///   not the short `tags` segment
    /// - `timeout`: upper bound for one pass (node fetch plus update)
    ///
    /// # Errors
    /// [`CoreError::Config`] for an empty node name, a zero timeout, or
    /// identical prefixes (tag cleanup would then delete identity labels).
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use decorator_core::ReconcilerConfig;
    /// use decorator_model::LabelPrefix;
    ///
    /// let prefix: LabelPrefix = "decorator.example.com".parse().unwrap();
    /// let tags = "tags".parse::<LabelPrefix>().unwrap().nested_under(&prefix);
    ///
    /// let cfg = ReconcilerConfig::new("worker-1", prefix, tags, Duration::from_secs(30)).unwrap();
    /// assert_eq!(cfg.tags_prefix().as_str(), "tags.decorator.example.com");
    /// ```
    pub fn new(
        node_name: impl Into<String>,
        prefix: LabelPrefix,
        tags_prefix: LabelPrefix,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let node_name = node_name.into();
        if node_name.trim().is_empty() {
            return Err(CoreError::Config("node name must not be empty".into()));
        }
        if timeout.is_zero() {
            return Err(CoreError::Config("timeout must be positive".into()));
        }
        if prefix == tags_prefix {
            return Err(CoreError::Config(format!(
                "identity and tags prefixes must differ (both are {prefix})"
            )));
        }
        Ok(Self {
            node_name,
            prefix,
            tags_prefix,
            timeout,
        })
    }

    /// Name of the decorated node.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Prefix of the identity labels.
    pub fn prefix(&self) -> &LabelPrefix {
        &self.prefix
    }

    /// Full prefix of the tag labels. Every label under it is owned by the
    /// reconciler and removed when no tag produces it.
    pub fn tags_prefix(&self) -> &LabelPrefix {
        &self.tags_prefix
    }

    /// Per-pass timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// What a successful pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Node labels already matched; nothing was written.
    Unchanged,
    /// Node was replaced with the listed label changes.
    Updated(LabelChanges),
}

/// Converges the labels of one node toward the latest instance data.
pub struct Reconciler<C> {
    client: C,
    cfg: ReconcilerConfig,
    metrics: MetricsHandle,
}

impl<C: NodeClient> Reconciler<C> {
    /// Create a reconciler that records nothing; see [`Reconciler::with_metrics`].
    pub fn new(client: C, cfg: ReconcilerConfig) -> Self {
        Self {
            client,
            cfg,
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Settings this reconciler was built with.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.cfg
    }

    /// Metrics backend, shared with the watch loop for watcher errors.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Run one pass.
    ///
    /// `None` instance data is rejected before any API call. The node fetch and
    /// update share one timeout, started fresh for every pass.
    ///
    /// # Errors
    /// - [`CoreError::InvalidInput`]: `data` is `None`
    /// - [`CoreError::Timeout`]: the pass exceeded the configured timeout
    /// - [`CoreError::Canceled`]: `cancel` fired first
    /// - [`CoreError::NodeNotFound`], [`CoreError::Conflict`], [`CoreError::Api`]:
    ///   surfaced from the [`NodeClient`]
    #[instrument(level = "debug", skip_all, fields(node = %self.cfg.node_name))]
    pub async fn reconcile(
        &self,
        cancel: &CancellationToken,
        data: Option<&InstanceData>,
    ) -> Result<ReconcileOutcome, CoreError> {
        let started = Instant::now();
        let res = match data {
            None => Err(CoreError::InvalidInput(
                "instance data received from metadata service is empty".into(),
            )),
            Some(data) => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(CoreError::Canceled),
                    res = timeout(self.cfg.timeout, self.pass(data)) => {
                        res.unwrap_or_else(|_| Err(CoreError::Timeout(self.cfg.timeout)))
                    }
                }
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &res {
            Ok(ReconcileOutcome::Unchanged) => {
                self.metrics
                    .record_reconcile(ReconcileResult::Unchanged, elapsed_ms);
            }
            Ok(ReconcileOutcome::Updated(changes)) => {
                self.metrics
                    .record_reconcile(ReconcileResult::Updated, elapsed_ms);
                self.metrics
                    .record_label_changes(changes.set.len(), changes.removed.len());
            }
            Err(_) => {
                self.metrics
                    .record_reconcile(ReconcileResult::Failed, elapsed_ms);
            }
        }
        res
    }

    async fn pass(&self, data: &InstanceData) -> Result<ReconcileOutcome, CoreError> {
        let mut node = self.client.get_node(&self.cfg.node_name).await?;
        debug!(instance = ?data, "updating node labels from instance data");

        let changes = self.desired_changes(&mut node, data);
        if changes.is_empty() {
            debug!("node labels already up to date");
            return Ok(ReconcileOutcome::Unchanged);
        }

        self.client.replace_node(&node).await?;
        info!(
            set = changes.set.len(),
            removed = changes.removed.len(),
            "node labels updated"
        );
        Ok(ReconcileOutcome::Updated(changes))
    }

    /// Apply the desired labels for `data` to `node` in memory.
    fn desired_changes(&self, node: &mut Node, data: &InstanceData) -> LabelChanges {
        let tags_key_prefix = self.cfg.tags_prefix.key_prefix();
        let identity = identity_labels(&self.cfg.prefix, data);
        let tags = normalize_tags(&data.tags, &tags_key_prefix);

        let labels = node.metadata.labels.get_or_insert_with(Default::default);
        apply_labels(labels, &identity, &tags, &tags_key_prefix)
    }
}
