//! Pre-deployment topology checks
//!
//! The backend only accepts a range whose links form one undirected tree
//! rooted in a main jumpbox. [`preflight`] reports what stands in the way
//! before the request is sent. Findings are advisory; nothing here blocks a
//! deployment.

use crate::topology::TopologySnapshot;
use crate::types::{EdgeId, NodeId, Role};
use petgraph::algo::{connected_components, is_cyclic_undirected};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One finding of the preflight check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// No node resolves to `jumpbox_main`
    MissingMaster,
    /// Edge endpoint no longer in the graph
    DanglingEdge { edge: EdgeId, missing: NodeId },
    SelfLoop { edge: EdgeId },
    /// Same unordered pair linked more than once
    DuplicateLink { edge: EdgeId },
    /// Graph falls apart into several components
    Disconnected { components: usize },
    /// Links close a loop
    Cycle,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingMaster => write!(f, "no main jumpbox in topology"),
            Issue::DanglingEdge { edge, missing } => {
                write!(f, "link {edge} references missing node {missing}")
            }
            Issue::SelfLoop { edge } => write!(f, "link {edge} connects a node to itself"),
            Issue::DuplicateLink { edge } => write!(f, "link {edge} duplicates another link"),
            Issue::Disconnected { components } => {
                write!(f, "topology is split into {components} disconnected parts")
            }
            Issue::Cycle => write!(f, "links form a cycle"),
        }
    }
}

/// Findings for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightReport {
    pub issues: Vec<Issue>,
}

impl PreflightReport {
    /// Whether the backend should accept the topology
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, issue: &Issue) -> bool {
        self.issues.contains(issue)
    }
}

/// Check `snapshot` against the backend's acceptance rules
#[must_use]
pub fn preflight(snapshot: &TopologySnapshot) -> PreflightReport {
    let mut issues = Vec::new();

    if !snapshot
        .nodes()
        .iter()
        .any(|n| n.resolved_role() == Role::JumpboxMain)
    {
        issues.push(Issue::MissingMaster);
    }

    let mut graph = UnGraph::<(), ()>::new_undirected();
    let mut index: HashMap<&NodeId, NodeIndex> = HashMap::new();
    for node in snapshot.nodes() {
        index.entry(&node.id).or_insert_with(|| graph.add_node(()));
    }

    let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
    for edge in snapshot.edges() {
        let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) else {
            for end in [&edge.source, &edge.target] {
                if !index.contains_key(end) {
                    issues.push(Issue::DanglingEdge {
                        edge: edge.id.clone(),
                        missing: end.clone(),
                    });
                }
            }
            continue;
        };

        if edge.is_self_loop() {
            issues.push(Issue::SelfLoop {
                edge: edge.id.clone(),
            });
            continue;
        }

        let pair = if a < b { (a, b) } else { (b, a) };
        if !seen.insert(pair) {
            issues.push(Issue::DuplicateLink {
                edge: edge.id.clone(),
            });
            continue;
        }

        graph.add_edge(a, b, ());
    }

    if graph.node_count() > 0 {
        let components = connected_components(&graph);
        if components > 1 {
            issues.push(Issue::Disconnected { components });
        }
    }

    if is_cyclic_undirected(&graph) {
        issues.push(Issue::Cycle);
    }

    PreflightReport { issues }
}
