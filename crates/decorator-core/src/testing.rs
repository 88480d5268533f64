//! In-memory doubles shared by the unit tests of this crate.
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::{
    error::{CoreError, MetadataError},
    metadata::MetadataSource,
    metrics::{ReconcileMetrics, ReconcileResult},
    node::NodeClient,
};
use decorator_model::InstanceData;

pub fn sample_instance() -> InstanceData {
    InstanceData {
        id: 42,
        label: "my-host".into(),
        region: "us-east".into(),
        instance_type: "g6-standard-2".into(),
        host_uuid: "abc-123".into(),
        tags: vec!["env=prod".into(), "team".into()],
    }
}

pub fn node_with_labels(name: &str, labels: &[(&str, &str)]) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[derive(Default)]
struct NodeStore {
    node: Mutex<Option<Node>>,
    version: AtomicUsize,
    gets: AtomicUsize,
    replaces: AtomicUsize,
    hang_on_get: AtomicBool,
    fail_replace: AtomicBool,
}

/// Single-node API store with resourceVersion bumping and call counters.
#[derive(Clone, Default)]
pub struct FakeNodes {
    inner: Arc<NodeStore>,
}

impl FakeNodes {
    pub fn new(node: Node) -> Self {
        let fake = Self::default();
        *fake.inner.node.lock().unwrap() = Some(node);
        fake
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.inner
            .node
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|n| n.metadata.labels.clone())
            .unwrap_or_default()
    }

    pub fn get_calls(&self) -> usize {
        self.inner.gets.load(Ordering::SeqCst)
    }

    pub fn replace_calls(&self) -> usize {
        self.inner.replaces.load(Ordering::SeqCst)
    }

    pub fn hang_on_get(&self) {
        self.inner.hang_on_get.store(true, Ordering::SeqCst);
    }

    pub fn fail_replace(&self, fail: bool) {
        self.inner.fail_replace.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NodeClient for FakeNodes {
    async fn get_node(&self, name: &str) -> Result<Node, CoreError> {
        self.inner.gets.fetch_add(1, Ordering::SeqCst);
        if self.inner.hang_on_get.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.inner
            .node
            .lock()
            .unwrap()
            .clone()
            .filter(|n| n.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| CoreError::NodeNotFound(name.to_string()))
    }

    async fn replace_node(&self, node: &Node) -> Result<Node, CoreError> {
        self.inner.replaces.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_replace.load(Ordering::SeqCst) {
            return Err(CoreError::Api("injected failure".into()));
        }

        let mut stored = node.clone();
        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        stored.metadata.resource_version = Some(version.to_string());
        *self.inner.node.lock().unwrap() = Some(stored.clone());
        Ok(stored)
    }
}

/// Metadata source that serves a scripted sequence of responses, then repeats the last one.
pub struct ScriptedSource {
    script: Mutex<Vec<Result<InstanceData, String>>>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<InstanceData, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn get_instance(&self) -> Result<InstanceData, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or_else(|| Err("empty script".into()))
        };
        next.map_err(MetadataError::Http)
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    updated: AtomicUsize,
    unchanged: AtomicUsize,
    failed: AtomicUsize,
    pub labels_set: AtomicUsize,
    pub labels_removed: AtomicUsize,
    pub watcher_errors: AtomicUsize,
}

impl RecordingMetrics {
    pub fn count(&self, result: ReconcileResult) -> usize {
        match result {
            ReconcileResult::Updated => self.updated.load(Ordering::SeqCst),
            ReconcileResult::Unchanged => self.unchanged.load(Ordering::SeqCst),
            ReconcileResult::Failed => self.failed.load(Ordering::SeqCst),
        }
    }
}

impl ReconcileMetrics for RecordingMetrics {
    fn record_reconcile(&self, result: ReconcileResult, _duration_ms: u64) {
        let counter = match result {
            ReconcileResult::Updated => &self.updated,
            ReconcileResult::Unchanged => &self.unchanged,
            ReconcileResult::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn record_label_changes(&self, set: usize, removed: usize) {
        self.labels_set.fetch_add(set, Ordering::SeqCst);
        self.labels_removed.fetch_add(removed, Ordering::SeqCst);
    }

    fn record_watcher_error(&self) {
        self.watcher_errors.fetch_add(1, Ordering::SeqCst);
    }
}
