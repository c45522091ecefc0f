//! Range Topology - the editor's graph model
//!
//! Holds the VMs and network links of a cyber range and translates between
//! the editor's records and the backend's wire format:
//! - [`Topology`]: node/edge store and editing operations
//! - [`NodeFactory`]: identity, placement and labels for new nodes
//! - [`DeploymentSerializer`]: topology → deployment request
//! - [`StateReconciler`]: persisted snapshot → topology
//! - [`preflight`]: advisory checks against the backend's acceptance rules
//!
//! # Example
//!
//! ```rust
//! use range_topology::{DeploymentSerializer, NodeId, Role, Topology};
//!
//! let mut topology = Topology::new();
//! let web = topology.add_node(Role::Service);
//! topology.connect(&NodeId::master(), &web).unwrap();
//!
//! let request = DeploymentSerializer::new().serialize(&topology.snapshot());
//! assert_eq!(request.nodes.len(), 2);
//! assert_eq!(request.links.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod preflight;
pub mod reconciler;
pub mod selection;
pub mod serializer;
pub mod topology;
pub mod types;
pub mod wire;

pub use error::{ReconcileError, TopologyError};
pub use factory::NodeFactory;
pub use lifecycle::{GraphEvent, GraphPhase};
pub use preflight::{preflight, Issue, PreflightReport};
pub use reconciler::{ReconcileOutcome, Restoration, StateReconciler};
pub use selection::Removal;
pub use serializer::DeploymentSerializer;
pub use topology::{Topology, TopologySnapshot};
pub use types::{Edge, EdgeId, Node, NodeId, NodeKind, NodeStyle, Position, Role, MASTER_ID};
pub use wire::{
    ConnectionType, DeleteResponse, DeploymentRequest, DeploymentResponse, LinkSpec, RangeMetadata,
    RangeSnapshot, SnapshotLink, SnapshotMetadata, SnapshotNode, VmSpec,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the topology
    pub use crate::{
        DeploymentSerializer, EdgeId, NodeId, Position, Role, StateReconciler, Topology,
        TopologySnapshot, MASTER_ID,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
