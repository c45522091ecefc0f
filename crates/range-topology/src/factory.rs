//! Node construction
//!
//! Every node the editor adds goes through [`NodeFactory`], which assigns a
//! fresh identity, a random spot on the canvas and the default label.

use crate::types::{Node, NodeId, Position, Role, MASTER_LABEL};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Side length of the square new nodes are scattered over
pub const PLACEMENT_SPAN: f64 = 400.0;

/// Builds node records for the topology
#[derive(Debug, Clone)]
pub struct NodeFactory {
    rng: StdRng,
}

impl NodeFactory {
    /// Factory seeded from the OS
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Factory with reproducible placement
    #[inline]
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The master jumpbox every topology starts with
    #[must_use]
    pub fn master() -> Node {
        Node::new(
            NodeId::master(),
            MASTER_LABEL,
            Some(Role::JumpboxMain),
            Position::origin(),
        )
    }

    /// New node for `role`. `existing` is the node count before insertion
    /// and numbers the label (`"SERVICE 2"` for the second node).
    pub fn create(&mut self, role: Role, existing: usize) -> Node {
        let label = default_label(role, existing);
        Node::new(NodeId::generate(), label, Some(role), self.random_position())
    }

    fn random_position(&mut self) -> Position {
        Position::new(
            self.rng.random_range(0.0..PLACEMENT_SPAN),
            self.rng.random_range(0.0..PLACEMENT_SPAN),
        )
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// `"{ROLE} {existing + 1}"`
#[must_use]
pub fn default_label(role: Role, existing: usize) -> String {
    format!("{} {}", role.as_str().to_uppercase(), existing + 1)
}
