//! `kube`-backed implementation of [`NodeClient`].
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::{
    Client,
    api::{Api, PostParams},
};
use tracing::{debug, trace};

use decorator_core::{CoreError, NodeClient};

/// Node access through the Kubernetes API server.
///
/// `replace_node` is a full PUT carrying the fetched `resourceVersion`, so a
/// concurrent writer makes the call fail with [`CoreError::Conflict`] instead of
/// being overwritten.
#[derive(Clone)]
pub struct KubeNodeClient {
    api: Api<Node>,
}

impl KubeNodeClient {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }

    /// Build a client from in-cluster config or the local kubeconfig.
    pub async fn try_default() -> Result<Self, CoreError> {
        let client = Client::try_default()
            .await
            .map_err(|e| CoreError::Config(format!("failed to create kubernetes client: {e}")))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl NodeClient for KubeNodeClient {
    async fn get_node(&self, name: &str) -> Result<Node, CoreError> {
        trace!(node = name, "fetching node");
        self.api
            .get(name)
            .await
            .map_err(|e| map_kube_error(e, name))
    }

    async fn replace_node(&self, node: &Node) -> Result<Node, CoreError> {
        let name = node
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| CoreError::InvalidInput("node has no name".into()))?;

        debug!(
            node = name,
            resource_version = node.metadata.resource_version.as_deref().unwrap_or(""),
            "replacing node"
        );
        self.api
            .replace(name, &PostParams::default(), node)
            .await
            .map_err(|e| map_kube_error(e, name))
    }
}

/// Map API failures onto the error kinds the reconciler distinguishes.
fn map_kube_error(err: kube::Error, name: &str) -> CoreError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => CoreError::NodeNotFound(name.to_string()),
        kube::Error::Api(resp) if resp.code == 409 => CoreError::Conflict(resp.message),
        other => CoreError::Api(other.to_string()),
    }
}
