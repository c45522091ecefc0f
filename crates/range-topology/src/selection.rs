//! Selection handling
//!
//! The rendering layer owns the selection flags; the topology only reads
//! them for bulk removal. Nodes and edges are filtered independently: an
//! unselected edge survives the deletion of its endpoints.

use crate::error::TopologyError;
use crate::lifecycle::GraphEvent;
use crate::topology::Topology;
use crate::types::{Edge, EdgeId, Node, NodeId};

/// What a bulk delete removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removal {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Removal {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Split records into (kept, removed) by selection flag
fn partition<T: Clone>(records: &[T], selected: impl Fn(&T) -> bool) -> (Vec<T>, Vec<T>) {
    records.iter().cloned().partition(|r| !selected(r))
}

impl Topology {
    /// Remove every selected node and every selected edge.
    ///
    /// Edges referencing a deleted node are kept unless they are selected
    /// themselves. A call that removes nothing is not an edit.
    pub fn delete_selected(&mut self) -> Removal {
        let (nodes, removed_nodes) = partition(&self.nodes[..], |n: &Node| n.selected);
        let (edges, removed_edges) = partition(&self.edges[..], |e: &Edge| e.selected);
        let removal = Removal {
            nodes: removed_nodes,
            edges: removed_edges,
        };

        if removal.is_empty() {
            return removal;
        }

        tracing::debug!(
            nodes = removal.nodes.len(),
            edges = removal.edges.len(),
            "deleting selection"
        );
        self.nodes = nodes.into();
        self.edges = edges.into();
        self.advance(GraphEvent::Edit);
        removal
    }

    /// Set the selection flag of one node
    ///
    /// # Errors
    /// - `TopologyError::UnknownNode` if no node has that id
    pub fn set_node_selected(&mut self, id: &NodeId, selected: bool) -> Result<(), TopologyError> {
        let node = self
            .node(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.clone()))?
            .clone()
            .with_selected(selected);
        self.replace_node(node)
    }

    /// Set the selection flag of one edge
    ///
    /// # Errors
    /// - `TopologyError::UnknownEdge` if no edge has that id
    pub fn set_edge_selected(&mut self, id: &EdgeId, selected: bool) -> Result<(), TopologyError> {
        let edge = self
            .edge(id)
            .ok_or_else(|| TopologyError::UnknownEdge(id.clone()))?
            .clone()
            .with_selected(selected);
        self.replace_edge(edge)
    }

    /// Drop every selection flag
    pub fn clear_selection(&mut self) {
        if self.nodes.iter().any(|n| n.selected) {
            let nodes: Vec<Node> = self.nodes.iter().cloned().map(|n| n.with_selected(false)).collect();
            self.nodes = nodes.into();
        }
        if self.edges.iter().any(|e| e.selected) {
            let edges: Vec<Edge> = self.edges.iter().cloned().map(|e| e.with_selected(false)).collect();
            self.edges = edges.into();
        }
    }

    #[must_use]
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|n| n.selected).map(|n| n.id.clone()).collect()
    }

    #[must_use]
    pub fn selected_edges(&self) -> Vec<EdgeId> {
        self.edges.iter().filter(|e| e.selected).map(|e| e.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::NodeFactory;
    use crate::lifecycle::GraphPhase;
    use crate::topology::Topology;
    use crate::types::{NodeId, Role};

    #[test]
    fn deleting_node_keeps_unselected_incident_edges() {
        let mut topo = Topology::with_factory(NodeFactory::with_seed(3));
        let master = NodeId::master();
        let s = topo.add_node(Role::Service);
        let edge = topo.connect(&master, &s).unwrap();

        topo.set_node_selected(&s, true).unwrap();
        let removal = topo.delete_selected();

        assert_eq!(removal.nodes.len(), 1);
        assert!(removal.edges.is_empty());
        assert!(!topo.contains_node(&s));
        let dangling = topo.edge(&edge).unwrap();
        assert_eq!(dangling.target, s);
    }

    #[test]
    fn selected_edge_goes_with_node() {
        let mut topo = Topology::with_factory(NodeFactory::with_seed(3));
        let master = NodeId::master();
        let s = topo.add_node(Role::Service);
        let edge = topo.connect(&master, &s).unwrap();

        topo.set_node_selected(&s, true).unwrap();
        topo.set_edge_selected(&edge, true).unwrap();
        let removal = topo.delete_selected();

        assert_eq!(removal.nodes.len(), 1);
        assert_eq!(removal.edges.len(), 1);
        assert_eq!(topo.edge_count(), 0);
    }

    #[test]
    fn master_can_be_deleted() {
        let mut topo = Topology::new();
        topo.set_node_selected(&NodeId::master(), true).unwrap();
        topo.delete_selected();
        assert_eq!(topo.node_count(), 0);
    }

    #[test]
    fn empty_selection_is_not_an_edit() {
        let mut topo = Topology::new();
        let removal = topo.delete_selected();
        assert!(removal.is_empty());
        assert_eq!(topo.phase(), GraphPhase::Initialized);
        assert_eq!(topo.revision(), 0);
    }

    #[test]
    fn clear_selection_resets_flags() {
        let mut topo = Topology::new();
        let master = NodeId::master();
        let edge = topo.connect(&master, &master).unwrap();
        topo.set_node_selected(&master, true).unwrap();
        topo.set_edge_selected(&edge, true).unwrap();

        topo.clear_selection();

        assert!(topo.selected_nodes().is_empty());
        assert!(topo.selected_edges().is_empty());
    }
}
