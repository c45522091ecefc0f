//! Projection of a topology into a deployment request

use crate::topology::TopologySnapshot;
use crate::types::{Edge, Node, MASTER_ID};
use crate::wire::{ConnectionType, DeploymentRequest, LinkSpec, RangeMetadata, VmSpec, RANGE_NAME, TEMPLATE_ID};

/// Builds the `POST /api/v1/range` body.
///
/// The range is always addressed by the master id; metadata is not derived
/// from the graph.
#[derive(Debug, Clone)]
pub struct DeploymentSerializer {
    range_name: String,
}

impl DeploymentSerializer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            range_name: RANGE_NAME.to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_range_name(mut self, name: impl Into<String>) -> Self {
        self.range_name = name.into();
        self
    }

    /// Serialize every node and edge of `snapshot`
    #[must_use]
    pub fn serialize(&self, snapshot: &TopologySnapshot) -> DeploymentRequest {
        DeploymentRequest {
            range_metadata: RangeMetadata {
                id: MASTER_ID.to_string(),
                name: self.range_name.clone(),
            },
            nodes: snapshot.nodes().iter().map(vm_spec).collect(),
            links: snapshot.edges().iter().map(link_spec).collect(),
        }
    }
}

impl Default for DeploymentSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn vm_spec(node: &Node) -> VmSpec {
    VmSpec {
        id: node.id.clone(),
        label: node.label.clone(),
        template_id: TEMPLATE_ID,
        role: node.resolved_role(),
        position: node.position,
    }
}

fn link_spec(edge: &Edge) -> LinkSpec {
    LinkSpec {
        source: edge.source.clone(),
        target: edge.target.clone(),
        connection_type: ConnectionType::VlanBridge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;
    use crate::types::{NodeId, Role};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn initial_graph_serializes_master_only() {
        let request = DeploymentSerializer::new().serialize(&Topology::new().snapshot());

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "range_metadata": { "id": MASTER_ID, "name": "Cyber-Lab" },
                "nodes": [{
                    "id": MASTER_ID,
                    "label": "Jumpbox",
                    "template_id": 1001,
                    "role": "jumpbox_main",
                    "position": { "x": 0.0, "y": 0.0 }
                }],
                "links": []
            })
        );
    }

    #[test]
    fn unset_master_role_resolves_to_main_jumpbox() {
        let mut topo = Topology::new();
        let mut master = topo.node(&NodeId::master()).unwrap().clone();
        master.role = None;
        topo.replace_node(master).unwrap();

        let request = DeploymentSerializer::new().serialize(&topo.snapshot());
        assert_eq!(request.nodes[0].role, Role::JumpboxMain);
    }

    #[test]
    fn links_are_always_vlan_bridges() {
        let mut topo = Topology::new();
        let master = NodeId::master();
        let s = topo.add_node(Role::Service);
        topo.connect(&master, &s).unwrap();
        topo.connect(&s, &master).unwrap();

        let request = DeploymentSerializer::new().serialize(&topo.snapshot());
        assert_eq!(request.links.len(), 2);
        assert!(request
            .links
            .iter()
            .all(|l| l.connection_type == ConnectionType::VlanBridge));
    }

    #[test]
    fn custom_range_name() {
        let request = DeploymentSerializer::new()
            .with_range_name("Red-Team")
            .serialize(&Topology::new().snapshot());
        assert_eq!(request.range_metadata.name, "Red-Team");
        assert_eq!(request.range_metadata.id, MASTER_ID);
    }
}
