//! Testing utilities for the cyber-range workspace
//!
//! Snapshot fixtures and an in-memory [`FakeBackend`].

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use range_sync::{BackendError, RangeBackend};
use range_topology::{
    DeleteResponse, DeploymentRequest, DeploymentResponse, RangeSnapshot, SnapshotLink,
    SnapshotMetadata, SnapshotNode, MASTER_ID,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Notify;

/// Persisted two-node lab: the master jumpbox linked to one service
pub fn lab_snapshot() -> Value {
    json!({
        "metadata": { "id": MASTER_ID, "name": "Cyber-Lab" },
        "nodes": [
            {
                "id": MASTER_ID,
                "label": "Jumpbox",
                "role": "jumpbox_main",
                "position": { "x": 250.0, "y": 5.0 },
                "template_id": 1001,
                "vmid": 200
            },
            service_node("S1", "Web Server", 100.0, 100.0)
        ],
        "links": [link(MASTER_ID, "S1")],
        "status": "active"
    })
}

/// Snapshot of an unrelated range
pub fn foreign_snapshot(range_id: &str) -> Value {
    json!({
        "metadata": { "id": range_id, "name": "Other" },
        "nodes": [service_node("X1", "Other Service", 0.0, 0.0)],
        "links": []
    })
}

/// Persisted service node entry
pub fn service_node(id: &str, label: &str, x: f64, y: f64) -> Value {
    json!({
        "id": id,
        "label": label,
        "role": "service",
        "position": { "x": x, "y": y }
    })
}

/// Persisted link entry
pub fn link(source: &str, target: &str) -> Value {
    json!({ "source": source, "target": target, "connection_type": "vlan_bridge" })
}

/// Snapshot the backend stores for an accepted `request`
///
/// Link ids are left unset; the backend never persists them.
pub fn persisted_snapshot(request: &DeploymentRequest, status: &str) -> RangeSnapshot {
    RangeSnapshot {
        metadata: SnapshotMetadata {
            id: request.range_metadata.id.clone(),
            name: Some(request.range_metadata.name.clone()),
            created_by: None,
        },
        nodes: request
            .nodes
            .iter()
            .map(|vm| SnapshotNode {
                id: vm.id.clone(),
                label: vm.label.clone(),
                role: Some(vm.role),
                position: Some(vm.position),
                template_id: Some(vm.template_id),
                vmid: None,
            })
            .collect(),
        links: request
            .links
            .iter()
            .map(|l| SnapshotLink {
                source: l.source.clone(),
                target: l.target.clone(),
                id: None,
                connection_type: Some(l.connection_type),
            })
            .collect(),
        status: Some(status.to_string()),
    }
}

#[derive(Debug, Default)]
struct FakeState {
    ranges: Vec<Value>,
    deployed: Vec<DeploymentRequest>,
    deleted: Vec<String>,
    list_calls: usize,
    offline: bool,
    rejection: Option<(u16, String)>,
}

/// In-memory backend that persists deployments the way the real one does
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    load_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend already holding `ranges`
    pub fn with_ranges(ranges: Vec<Value>) -> Self {
        let backend = Self::new();
        backend.state.lock().ranges = ranges;
        backend
    }

    /// Every request fails as unreachable while set
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Answer every deploy with `status` and `detail`
    pub fn reject_deploys(&self, status: u16, detail: &str) {
        self.state.lock().rejection = Some((status, detail.to_string()));
    }

    /// Hold `list_ranges` until [`Self::release_loads`] is called
    pub fn hold_loads(&self) {
        *self.load_gate.lock() = Some(Arc::new(Notify::new()));
    }

    /// Let one held `list_ranges` call answer
    pub fn release_loads(&self) {
        if let Some(gate) = self.load_gate.lock().as_ref() {
            gate.notify_one();
        }
    }

    pub fn ranges(&self) -> Vec<Value> {
        self.state.lock().ranges.clone()
    }

    pub fn deployed(&self) -> Vec<DeploymentRequest> {
        self.state.lock().deployed.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().deleted.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    fn ensure_online(&self) -> Result<(), BackendError> {
        if self.state.lock().offline {
            Err(BackendError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

fn range_id_of(snapshot: &Value) -> Option<&str> {
    snapshot.get("metadata")?.get("id")?.as_str()
}

#[async_trait]
impl RangeBackend for FakeBackend {
    async fn list_ranges(&self) -> Result<Vec<Value>, BackendError> {
        self.state.lock().list_calls += 1;
        let gate = self.load_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.ensure_online()?;
        Ok(self.ranges())
    }

    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentResponse, BackendError> {
        self.ensure_online()?;
        let mut state = self.state.lock();
        if let Some((status, detail)) = state.rejection.clone() {
            return Err(BackendError::status(status, detail));
        }

        let range_id = request.range_metadata.id.clone();
        let snapshot = serde_json::to_value(persisted_snapshot(request, "deploying"))
            .map_err(BackendError::Decode)?;
        state.ranges.retain(|r| range_id_of(r) != Some(range_id.as_str()));
        state.ranges.push(snapshot);
        state.deployed.push(request.clone());

        Ok(DeploymentResponse {
            range_id,
            status: "accepted".to_string(),
            message: "Reconciliation task started.".to_string(),
        })
    }

    async fn delete_range(&self, range_id: &str) -> Result<DeleteResponse, BackendError> {
        self.ensure_online()?;
        let mut state = self.state.lock();
        let before = state.ranges.len();
        state.ranges.retain(|r| range_id_of(r) != Some(range_id));
        if state.ranges.len() == before {
            return Err(BackendError::status(404, "Range not found"));
        }
        state.deleted.push(range_id.to_string());

        Ok(DeleteResponse {
            range_id: range_id.to_string(),
            status: "deleted".to_string(),
        })
    }
}
