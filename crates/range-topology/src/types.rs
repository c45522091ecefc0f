//! Core types for the range topology
//!
//! Defines the records the editor works with:
//! - Node and edge identifiers
//! - VM roles and their derived presentation
//! - Node and edge records as held by the topology

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reserved identifier of the master jumpbox.
///
/// The persisted range is addressed by the same value.
pub const MASTER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Label given to the master jumpbox of a fresh topology
pub const MASTER_LABEL: &str = "Jumpbox";

/// Node identifier
///
/// Opaque string. Freshly generated ids are UUID v4; ids restored from the
/// backend are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved master jumpbox identifier
    #[inline]
    #[must_use]
    pub fn master() -> Self {
        Self(MASTER_ID.to_string())
    }

    /// Generate a fresh unique identifier
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Whether this is the master jumpbox identifier
    #[inline]
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.0 == MASTER_ID
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Edge identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for a user-created connection
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("e-{}", Uuid::new_v4()))
    }

    /// Deterministic identifier for an edge restored from a snapshot.
    ///
    /// Two links with the same endpoints map to the same id.
    #[inline]
    #[must_use]
    pub fn synthesized(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("e-{source}-{target}"))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// VM role within the range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Gateway host into the range
    JumpboxMain,
    /// Secondary jumpbox inside the range
    JumpboxLocal,
    /// Service VM
    Service,
}

impl Role {
    /// Wire name of the role
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::JumpboxMain => "jumpbox_main",
            Role::JumpboxLocal => "jumpbox_local",
            Role::Service => "service",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Canvas origin
    #[inline]
    #[must_use]
    pub fn origin() -> Self {
        Self::default()
    }
}

const SERVICE_FILL: &str = "#d9f7be";
const JUMPBOX_FILL: &str = "#bae7ff";
const NODE_BORDER: &str = "1px solid #777";
const NODE_BORDER_RADIUS: &str = "5px";

/// Presentation of a node, computed from its role on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    /// Fill color
    pub background: &'static str,
    pub border: &'static str,
    pub border_radius: &'static str,
}

impl NodeStyle {
    /// Style for a role. Anything that is not a service, including a missing
    /// role, gets the jumpbox fill.
    #[inline]
    #[must_use]
    pub fn for_role(role: Option<Role>) -> Self {
        let background = match role {
            Some(Role::Service) => SERVICE_FILL,
            _ => JUMPBOX_FILL,
        };
        Self {
            background,
            border: NODE_BORDER,
            border_radius: NODE_BORDER_RADIUS,
        }
    }
}

/// How the rendering layer draws a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Fixed entry point with no inbound handle
    Anchor,
    /// Regular interactive node
    Default,
}

impl NodeKind {
    #[inline]
    #[must_use]
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::JumpboxMain) => NodeKind::Anchor,
            _ => NodeKind::Default,
        }
    }
}

/// Node record
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    /// `None` when the role was never set; resolved at serialization time
    pub role: Option<Role>,
    pub label: String,
    /// Set by the rendering layer
    pub selected: bool,
}

impl Node {
    /// Create an unselected node record
    #[inline]
    #[must_use]
    pub fn new(id: NodeId, label: impl Into<String>, role: Option<Role>, position: Position) -> Self {
        Self {
            id,
            position,
            role,
            label: label.into(),
            selected: false,
        }
    }

    /// Derived style, never stored
    #[inline]
    #[must_use]
    pub fn style(&self) -> NodeStyle {
        NodeStyle::for_role(self.role)
    }

    /// Derived render kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        NodeKind::for_role(self.role)
    }

    /// Role sent to the backend: an unset role on the master node is
    /// `jumpbox_main`, on any other node `service`.
    #[inline]
    #[must_use]
    pub fn resolved_role(&self) -> Role {
        match self.role {
            Some(role) => role,
            None if self.id.is_master() => Role::JumpboxMain,
            None => Role::Service,
        }
    }

    /// Copy of the record with the selection flag set
    #[inline]
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Copy of the record moved to `position`
    #[inline]
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// Edge record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Set by the rendering layer
    pub selected: bool,
}

impl Edge {
    #[inline]
    #[must_use]
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            selected: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    #[inline]
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}
