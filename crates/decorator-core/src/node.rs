//! Kubernetes node access used by the reconciler.
//!
//! Implemented by `decorator-kube` for a live cluster and by in-memory fakes in tests.
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;

use crate::error::CoreError;

/// Read-modify-write access to a single Node object.
///
/// Implementations must keep the API server's optimistic concurrency: `replace_node`
/// sends the `resourceVersion` it was given and reports a stale write as
/// [`CoreError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch the latest version of the named node.
    ///
    /// A missing node is reported as [`CoreError::NodeNotFound`].
    async fn get_node(&self, name: &str) -> Result<Node, CoreError>;

    /// Replace the node with the given object and return the stored version.
    async fn replace_node(&self, node: &Node) -> Result<Node, CoreError>;
}
