//! Rebuilding the topology from persisted backend state
//!
//! Reconciliation runs in two steps so the network round trip never holds
//! the topology:
//! 1. [`StateReconciler::plan`] picks the snapshot of our range out of the
//!    fetched collection and turns it into node and edge records.
//! 2. [`Restoration::apply_to`] swaps those records into the topology.
//!
//! Only the snapshot addressed by the range id is decoded. When it is
//! missing the topology is left alone; when it is malformed the error is
//! returned and the caller keeps its default graph.

use crate::error::ReconcileError;
use crate::topology::Topology;
use crate::types::{Edge, EdgeId, Node, Position, MASTER_ID};
use crate::wire::RangeSnapshot;
use serde_json::Value;

/// Records ready to replace the topology's contents
#[derive(Debug, Clone, PartialEq)]
pub struct Restoration {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Backend status of the snapshot, if reported
    pub status: Option<String>,
}

impl Restoration {
    /// Replace both collections of `topology`, returning the restored
    /// node and edge counts
    pub fn apply_to(self, topology: &mut Topology) -> (usize, usize) {
        let counts = (self.nodes.len(), self.edges.len());
        topology.restore(self.nodes, self.edges);
        counts
    }
}

/// Result of a completed reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Topology replaced
    Restored { nodes: usize, edges: usize },
    /// No snapshot for the range; topology untouched
    NotFound,
}

/// Locates and rebuilds the snapshot of one range
#[derive(Debug, Clone)]
pub struct StateReconciler {
    range_id: String,
}

impl StateReconciler {
    /// Reconciler for the range addressed by the master id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::for_range(MASTER_ID)
    }

    #[inline]
    #[must_use]
    pub fn for_range(range_id: impl Into<String>) -> Self {
        Self {
            range_id: range_id.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn range_id(&self) -> &str {
        &self.range_id
    }

    /// First snapshot whose `metadata.id` is our range id, decoded
    ///
    /// # Errors
    /// - `ReconcileError::MalformedSnapshot` if that snapshot does not decode
    pub fn locate(&self, snapshots: &[Value]) -> Result<Option<RangeSnapshot>, ReconcileError> {
        let Some(raw) = snapshots.iter().find(|s| self.matches(s)) else {
            return Ok(None);
        };

        serde_json::from_value::<RangeSnapshot>(raw.clone())
            .map(Some)
            .map_err(|e| ReconcileError::malformed(&self.range_id, e))
    }

    /// Locate our snapshot and rebuild its records
    ///
    /// # Errors
    /// - `ReconcileError::MalformedSnapshot` if the snapshot does not decode
    pub fn plan(&self, snapshots: &[Value]) -> Result<Option<Restoration>, ReconcileError> {
        Ok(self.locate(snapshots)?.map(|s| Self::rebuild(&s)))
    }

    /// Locate, rebuild and apply in one step
    ///
    /// # Errors
    /// - `ReconcileError::MalformedSnapshot`; the topology is left unchanged
    pub fn reconcile(
        &self,
        topology: &mut Topology,
        snapshots: &[Value],
    ) -> Result<ReconcileOutcome, ReconcileError> {
        match self.plan(snapshots)? {
            Some(restoration) => {
                let (nodes, edges) = restoration.apply_to(topology);
                Ok(ReconcileOutcome::Restored { nodes, edges })
            }
            None => Ok(ReconcileOutcome::NotFound),
        }
    }

    /// Node and edge records for a snapshot.
    ///
    /// Missing positions become the origin, edge ids are synthesized from
    /// their endpoints. A missing role stays unset; style and render kind
    /// follow from whatever role there is.
    #[must_use]
    pub fn rebuild(snapshot: &RangeSnapshot) -> Restoration {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|n| {
                Node::new(
                    n.id.clone(),
                    n.label.clone(),
                    n.role,
                    n.position.unwrap_or_else(Position::origin),
                )
            })
            .collect();

        let edges = snapshot
            .links
            .iter()
            .map(|l| {
                Edge::new(
                    EdgeId::synthesized(&l.source, &l.target),
                    l.source.clone(),
                    l.target.clone(),
                )
            })
            .collect();

        Restoration {
            nodes,
            edges,
            status: snapshot.status.clone(),
        }
    }

    fn matches(&self, snapshot: &Value) -> bool {
        snapshot
            .get("metadata")
            .and_then(|m| m.get("id"))
            .and_then(Value::as_str)
            == Some(self.range_id.as_str())
    }
}

impl Default for StateReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::GraphPhase;
    use crate::types::{NodeKind, NodeId, Role};
    use serde_json::json;

    fn lab(nodes: Value, links: Value) -> Value {
        json!({ "metadata": { "id": MASTER_ID, "name": "Cyber-Lab" }, "nodes": nodes, "links": links })
    }

    #[test]
    fn no_matching_snapshot_leaves_topology() {
        let mut topo = Topology::new();
        let other = json!({ "metadata": { "id": "someone-else" }, "nodes": [], "links": [] });

        let outcome = StateReconciler::new().reconcile(&mut topo, &[other]).unwrap();

        assert_eq!(outcome, ReconcileOutcome::NotFound);
        assert_eq!(topo.node_count(), 1);
        assert_eq!(topo.phase(), GraphPhase::Initialized);
    }

    #[test]
    fn restore_replaces_everything() {
        let mut topo = Topology::new();
        topo.add_node(Role::Service);
        let snapshot = lab(
            json!([
                { "id": MASTER_ID, "label": "Jumpbox", "role": "jumpbox_main" },
                { "id": "S1", "label": "Web", "role": "service", "position": { "x": 10.0, "y": 20.0 } }
            ]),
            json!([{ "source": MASTER_ID, "target": "S1" }]),
        );

        let outcome = StateReconciler::new().reconcile(&mut topo, &[snapshot]).unwrap();

        assert_eq!(outcome, ReconcileOutcome::Restored { nodes: 2, edges: 1 });
        assert_eq!(topo.phase(), GraphPhase::Restored);
        let master = topo.node(&NodeId::master()).unwrap();
        assert_eq!(master.position, Position::origin());
        assert_eq!(master.kind(), NodeKind::Anchor);
        let s1 = topo.node(&NodeId::new("S1")).unwrap();
        assert_eq!(s1.position, Position::new(10.0, 20.0));
        assert_eq!(s1.kind(), NodeKind::Default);
        assert_eq!(s1.style().background, "#d9f7be");
        assert_eq!(topo.edges()[0].id.as_str(), format!("e-{MASTER_ID}-S1"));
    }

    #[test]
    fn duplicate_links_collide_on_id() {
        let snapshot = lab(
            json!([{ "id": "a", "label": "A", "role": "service" }]),
            json!([{ "source": "a", "target": "a" }, { "source": "a", "target": "a" }]),
        );
        let restoration = StateReconciler::new().plan(&[snapshot]).unwrap().unwrap();

        assert_eq!(restoration.edges.len(), 2);
        assert_eq!(restoration.edges[0].id, restoration.edges[1].id);
    }

    #[test]
    fn first_match_wins() {
        let first = lab(json!([{ "id": "a", "label": "first", "role": "service" }]), json!([]));
        let second = lab(json!([{ "id": "b", "label": "second", "role": "service" }]), json!([]));

        let restoration = StateReconciler::new().plan(&[first, second]).unwrap().unwrap();
        assert_eq!(restoration.nodes[0].label, "first");
    }

    #[test]
    fn malformed_match_fails_closed() {
        let mut topo = Topology::new();
        let broken = lab(json!([{ "id": "a", "role": "service" }]), json!([]));

        let err = StateReconciler::new().reconcile(&mut topo, &[broken]).unwrap_err();

        assert!(matches!(err, ReconcileError::MalformedSnapshot { .. }));
        assert_eq!(topo.node_count(), 1);
        assert_eq!(topo.phase(), GraphPhase::Initialized);
    }

    #[test]
    fn malformed_unrelated_entry_is_ignored() {
        let junk = json!({ "metadata": 7 });
        let good = lab(json!([]), json!([]));
        assert!(StateReconciler::new().plan(&[junk, good]).unwrap().is_some());
    }

    #[test]
    fn missing_role_is_restored_unset() {
        let mut topo = Topology::new();
        let snapshot = lab(
            json!([
                { "id": MASTER_ID, "label": "Jumpbox" },
                { "id": "S1", "label": "Web", "position": { "x": 10.0, "y": 20.0 } }
            ]),
            json!([{ "source": MASTER_ID, "target": "S1" }]),
        );

        let outcome = StateReconciler::new().reconcile(&mut topo, &[snapshot]).unwrap();

        assert_eq!(outcome, ReconcileOutcome::Restored { nodes: 2, edges: 1 });
        let s1 = topo.node(&NodeId::new("S1")).unwrap();
        assert_eq!(s1.role, None);
        assert_eq!(s1.style().background, "#bae7ff");
        assert_eq!(s1.kind(), NodeKind::Default);
        assert_eq!(s1.resolved_role(), Role::Service);
        assert_eq!(topo.node(&NodeId::master()).unwrap().resolved_role(), Role::JumpboxMain);
    }
}
