//! Wire format shared with the range backend
//!
//! - [`DeploymentRequest`]: body of `POST /api/v1/range`
//! - [`RangeSnapshot`]: element of `GET /api/v1/ranges`
//! - [`DeploymentResponse`] / [`DeleteResponse`]: acknowledgements

use crate::types::{NodeId, Position, Role};
use serde::{Deserialize, Serialize};

/// Name every range is deployed under
pub const RANGE_NAME: &str = "Cyber-Lab";

/// Template every VM is cloned from
pub const TEMPLATE_ID: u32 = 1001;

/// How two VMs are linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    /// Dedicated bridge per link
    #[default]
    VlanBridge,
}

/// Range identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeMetadata {
    pub id: String,
    pub name: String,
}

/// VM entry of a deployment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmSpec {
    pub id: NodeId,
    pub label: String,
    pub template_id: u32,
    pub role: Role,
    pub position: Position,
}

/// Link entry of a deployment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub source: NodeId,
    pub target: NodeId,
    pub connection_type: ConnectionType,
}

/// Body of `POST /api/v1/range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub range_metadata: RangeMetadata,
    pub nodes: Vec<VmSpec>,
    pub links: Vec<LinkSpec>,
}

/// Persisted range metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Persisted VM. Provisioning fields the editor does not use are kept so a
/// snapshot can be inspected, but never fed back into the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: NodeId,
    pub label: String,
    /// Older snapshots may omit the role; it is resolved on the next deploy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u32>,
}

/// Persisted link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLink {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<ConnectionType>,
}

/// Element of `GET /api/v1/ranges`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSnapshot {
    pub metadata: SnapshotMetadata,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub links: Vec<SnapshotLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Acknowledgement of a deployment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResponse {
    pub range_id: String,
    pub status: String,
    pub message: String,
}

/// Acknowledgement of a range deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub range_id: String,
    pub status: String,
}
