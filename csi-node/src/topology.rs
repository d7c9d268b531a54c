//! Node topology lookup
//!
//! NodeGetInfo reports the region and zone the node lives in. They come from
//! the well-known Kubernetes topology labels on the node object.

use std::collections::{BTreeMap, HashMap};

use k8s_openapi::api::core::v1::Node;
use kube::{Api, Client};
use thiserror::Error;
use tracing::debug;

/// Node label holding the region
pub const REGION_LABEL: &str = "topology.kubernetes.io/region";
/// Node label holding the zone
pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("failed to create kubernetes client: {0}")]
    Client(#[source] kube::Error),

    #[error("failed to get node {node_id}: {source}")]
    Lookup {
        node_id: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to get {what} for node {node_id}")]
    MissingLabel { node_id: String, what: &'static str },
}

/// Where a node is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTopology {
    pub region: String,
    pub zone: String,
}

impl NodeTopology {
    /// Build the topology from a node's labels. Both labels must be present
    /// and non-empty.
    pub fn from_labels(
        node_id: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<Self, TopologyError> {
        let label = |key: &str, what: &'static str| {
            labels
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| TopologyError::MissingLabel {
                    node_id: node_id.to_string(),
                    what,
                })
        };

        Ok(Self {
            region: label(REGION_LABEL, "region")?,
            zone: label(ZONE_LABEL, "zone")?,
        })
    }

    /// Topology segments as reported in NodeGetInfo.
    pub fn segments(&self) -> HashMap<String, String> {
        HashMap::from([
            (REGION_LABEL.to_string(), self.region.clone()),
            (ZONE_LABEL.to_string(), self.zone.clone()),
        ])
    }
}

/// Source of node placement information.
#[tonic::async_trait]
pub trait NodeInfoProvider: Send + Sync {
    async fn lookup(&self, node_id: &str) -> Result<NodeTopology, TopologyError>;
}

/// Reads topology labels from the Kubernetes API.
#[derive(Clone)]
pub struct KubeNodeInfoProvider {
    client: Client,
}

impl KubeNodeInfoProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the in-cluster service account or the local kubeconfig.
    pub async fn try_default() -> Result<Self, TopologyError> {
        let client = Client::try_default().await.map_err(TopologyError::Client)?;
        Ok(Self::new(client))
    }
}

#[tonic::async_trait]
impl NodeInfoProvider for KubeNodeInfoProvider {
    async fn lookup(&self, node_id: &str) -> Result<NodeTopology, TopologyError> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let node = nodes
            .get(node_id)
            .await
            .map_err(|source| TopologyError::Lookup {
                node_id: node_id.to_string(),
                source,
            })?;

        let labels = node.metadata.labels.unwrap_or_default();
        debug!(node_id = %node_id, labels = labels.len(), "Fetched node labels");

        NodeTopology::from_labels(node_id, &labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_labels() {
        let topology = NodeTopology::from_labels(
            "node-1",
            &labels(&[
                (REGION_LABEL, "region-a"),
                (ZONE_LABEL, "zone-1"),
                ("kubernetes.io/hostname", "node-1"),
            ]),
        )
        .unwrap();

        assert_eq!(topology.region, "region-a");
        assert_eq!(topology.zone, "zone-1");

        let segments = topology.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[REGION_LABEL], "region-a");
        assert_eq!(segments[ZONE_LABEL], "zone-1");
    }

    #[test]
    fn test_missing_region() {
        let err = NodeTopology::from_labels("node-1", &labels(&[(ZONE_LABEL, "zone-1")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to get region for node node-1");
    }

    #[test]
    fn test_empty_zone_is_missing() {
        let err = NodeTopology::from_labels(
            "node-1",
            &labels(&[(REGION_LABEL, "region-a"), (ZONE_LABEL, "")]),
        )
        .unwrap_err();
        assert!(matches!(err, TopologyError::MissingLabel { what: "zone", .. }));
    }
}
