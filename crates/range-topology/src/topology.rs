//! The topology aggregate
//!
//! [`Topology`] is the single source of truth for the editor's graph. Every
//! mutation builds a new collection and swaps it in whole, so a
//! [`TopologySnapshot`] handed to the rendering layer never changes under it.

use crate::error::TopologyError;
use crate::factory::NodeFactory;
use crate::lifecycle::{GraphEvent, GraphPhase};
use crate::types::{Edge, EdgeId, Node, NodeId, Position, Role};
use std::sync::Arc;

/// Immutable view of the graph at one revision
#[derive(Debug, Clone)]
pub struct TopologySnapshot {
    nodes: Arc<[Node]>,
    edges: Arc<[Edge]>,
    revision: u64,
    phase: GraphPhase,
}

impl TopologySnapshot {
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Structural revision the snapshot was taken at
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> GraphPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}

/// Node and edge collections plus lifecycle bookkeeping
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) nodes: Arc<[Node]>,
    pub(crate) edges: Arc<[Edge]>,
    phase: GraphPhase,
    revision: u64,
    factory: NodeFactory,
}

impl Topology {
    /// Initial graph: the master jumpbox and no edges
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(NodeFactory::new())
    }

    /// Initial graph with a caller-supplied factory
    #[must_use]
    pub fn with_factory(factory: NodeFactory) -> Self {
        Self {
            nodes: Arc::from(vec![NodeFactory::master()]),
            edges: Arc::from(Vec::new()),
            phase: GraphPhase::Initialized,
            revision: 0,
            factory,
        }
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    #[inline]
    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    #[inline]
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> GraphPhase {
        self.phase
    }

    /// Counter bumped by every structural change
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current state as an immutable snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            nodes: Arc::clone(&self.nodes),
            edges: Arc::clone(&self.edges),
            revision: self.revision,
            phase: self.phase,
        }
    }

    /// Append a new node for `role`. Never merges with an existing node.
    pub fn add_node(&mut self, role: Role) -> NodeId {
        let node = self.factory.create(role, self.nodes.len());
        let id = node.id.clone();
        tracing::debug!(node = %id, role = %role, label = %node.label, "adding node");

        let mut nodes = self.nodes.to_vec();
        nodes.push(node);
        self.nodes = nodes.into();
        self.advance(GraphEvent::Edit);
        id
    }

    /// Append an edge between two nodes present in the graph.
    ///
    /// Duplicate pairs and self-loops are accepted.
    ///
    /// # Errors
    /// - `TopologyError::UnknownNode` if either endpoint is not in the graph
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId, TopologyError> {
        self.require_node(source)?;
        self.require_node(target)?;

        let edge = Edge::new(EdgeId::generate(), source.clone(), target.clone());
        let id = edge.id.clone();
        tracing::debug!(edge = %id, %source, %target, "connecting nodes");

        let mut edges = self.edges.to_vec();
        edges.push(edge);
        self.edges = edges.into();
        self.advance(GraphEvent::Edit);
        Ok(id)
    }

    /// Replace the edge `old` with a fresh edge between the new endpoints.
    ///
    /// If `old` is not present nothing is removed and the new edge is still
    /// appended.
    ///
    /// # Errors
    /// - `TopologyError::UnknownNode` if either new endpoint is not in the
    ///   graph; the topology is left unchanged
    pub fn update_connection(
        &mut self,
        old: &EdgeId,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeId, TopologyError> {
        self.require_node(source)?;
        self.require_node(target)?;

        let mut edges: Vec<Edge> = self.edges.iter().filter(|e| &e.id != old).cloned().collect();
        if edges.len() == self.edges.len() {
            tracing::debug!(edge = %old, "edge to update not found, appending only");
        }

        let edge = Edge::new(EdgeId::generate(), source.clone(), target.clone());
        let id = edge.id.clone();
        tracing::debug!(old = %old, new = %id, %source, %target, "reconnecting edge");

        edges.push(edge);
        self.edges = edges.into();
        self.advance(GraphEvent::Edit);
        Ok(id)
    }

    /// Whole-record replacement of the node with the same id.
    ///
    /// Used by the rendering layer for moves and selection changes; does not
    /// count as a structural edit.
    ///
    /// # Errors
    /// - `TopologyError::UnknownNode` if no node has that id
    pub fn replace_node(&mut self, node: Node) -> Result<(), TopologyError> {
        let idx = self
            .nodes
            .iter()
            .position(|n| n.id == node.id)
            .ok_or_else(|| TopologyError::UnknownNode(node.id.clone()))?;

        let mut nodes = self.nodes.to_vec();
        nodes[idx] = node;
        self.nodes = nodes.into();
        Ok(())
    }

    /// Whole-record replacement of the first edge with the same id.
    ///
    /// # Errors
    /// - `TopologyError::UnknownEdge` if no edge has that id
    pub fn replace_edge(&mut self, edge: Edge) -> Result<(), TopologyError> {
        let idx = self
            .edges
            .iter()
            .position(|e| e.id == edge.id)
            .ok_or_else(|| TopologyError::UnknownEdge(edge.id.clone()))?;

        let mut edges = self.edges.to_vec();
        edges[idx] = edge;
        self.edges = edges.into();
        Ok(())
    }

    /// Move a node on the canvas
    ///
    /// # Errors
    /// - `TopologyError::UnknownNode` if no node has that id
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<(), TopologyError> {
        let node = self.require_node(id)?.clone().with_position(position);
        self.replace_node(node)
    }

    /// Swap both collections for restored records
    pub(crate) fn restore(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes.into();
        self.edges = edges.into();
        self.advance(GraphEvent::Restore);
    }

    /// Record a structural change
    pub(crate) fn advance(&mut self, event: GraphEvent) {
        self.phase = self.phase.on(event);
        self.revision += 1;
    }

    fn require_node(&self, id: &NodeId) -> Result<&Node, TopologyError> {
        self.node(id).ok_or_else(|| TopologyError::UnknownNode(id.clone()))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
