//! Editor controller
//!
//! Owns the [`Topology`] and mediates every exchange with the backend:
//! - Editing operations, applied under a short lock
//! - Restore: fetch persisted state and replace the topology
//! - Deploy: serialize the topology and submit it
//! - Delete: tear the persisted range down
//!
//! Backend requests go through the [`SyncGuard`], so load and deploy never
//! overlap. The topology lock is never held across a request. A load result
//! is applied only if the topology has not been edited since the load was
//! admitted, and nothing is applied after [`EditorController::shutdown`].

use crate::backend::RangeBackend;
use crate::config::ClientConfig;
use crate::error::{BackendError, SyncError};
use crate::guard::{Permit, RequestClass, SyncGuard};
use parking_lot::Mutex;
use range_topology::{
    preflight, DeleteResponse, DeploymentRequest, DeploymentResponse, DeploymentSerializer, EdgeId,
    NodeId, Position, PreflightReport, Removal, Role, StateReconciler, Topology,
    TopologyError, TopologySnapshot,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// How a restore attempt ended. Restore failures are never surfaced to the
/// user; the default graph simply stays in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Topology replaced from the persisted snapshot
    Restored { nodes: usize, edges: usize },
    /// Backend has no snapshot for the range
    NotFound,
    /// Fetch or decode failed; see logs
    Failed,
    /// Topology was edited while the load was in flight; result discarded
    Stale,
    /// Editor shut down before the result arrived
    ShutDown,
    /// A load or deploy was already in flight
    Busy,
}

impl RestoreOutcome {
    #[inline]
    #[must_use]
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored { .. })
    }
}

/// Admitted load waiting for its response
#[derive(Debug)]
struct PendingRestore {
    _permit: Permit,
    revision: u64,
}

/// Application controller for one editor session
pub struct EditorController {
    topology: Mutex<Topology>,
    backend: Arc<dyn RangeBackend>,
    guard: SyncGuard,
    serializer: DeploymentSerializer,
    reconciler: StateReconciler,
    alive: AtomicBool,
}

impl std::fmt::Debug for EditorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("topology", &self.topology)
            .field("guard", &self.guard)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

impl EditorController {
    /// Controller over the initial one-node topology
    #[must_use]
    pub fn new(backend: Arc<dyn RangeBackend>) -> Self {
        Self::with_topology(Topology::new(), backend)
    }

    #[must_use]
    pub fn with_topology(topology: Topology, backend: Arc<dyn RangeBackend>) -> Self {
        Self {
            topology: Mutex::new(topology),
            backend,
            guard: SyncGuard::new(),
            serializer: DeploymentSerializer::new(),
            reconciler: StateReconciler::new(),
            alive: AtomicBool::new(true),
        }
    }

    /// Controller using the deployment settings of `config`
    #[must_use]
    pub fn with_config(config: &ClientConfig, backend: Arc<dyn RangeBackend>) -> Self {
        let mut controller = Self::new(backend);
        controller.serializer = DeploymentSerializer::new().with_range_name(config.range_name.clone());
        controller
    }

    // === Editing ===

    /// Immutable view for the rendering layer
    #[must_use]
    pub fn snapshot(&self) -> TopologySnapshot {
        self.topology.lock().snapshot()
    }

    pub fn add_node(&self, role: Role) -> NodeId {
        self.topology.lock().add_node(role)
    }

    /// # Errors
    /// - `TopologyError::UnknownNode` if either endpoint is not in the graph
    pub fn connect(&self, source: &NodeId, target: &NodeId) -> Result<EdgeId, TopologyError> {
        self.topology.lock().connect(source, target)
    }

    /// # Errors
    /// - `TopologyError::UnknownNode` if either new endpoint is not in the graph
    pub fn update_connection(
        &self,
        old: &EdgeId,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<EdgeId, TopologyError> {
        self.topology.lock().update_connection(old, source, target)
    }

    /// # Errors
    /// - `TopologyError::UnknownNode` if no node has that id
    pub fn move_node(&self, id: &NodeId, position: Position) -> Result<(), TopologyError> {
        self.topology.lock().move_node(id, position)
    }

    /// # Errors
    /// - `TopologyError::UnknownNode` if no node has that id
    pub fn set_node_selected(&self, id: &NodeId, selected: bool) -> Result<(), TopologyError> {
        self.topology.lock().set_node_selected(id, selected)
    }

    /// # Errors
    /// - `TopologyError::UnknownEdge` if no edge has that id
    pub fn set_edge_selected(&self, id: &EdgeId, selected: bool) -> Result<(), TopologyError> {
        self.topology.lock().set_edge_selected(id, selected)
    }

    pub fn clear_selection(&self) {
        self.topology.lock().clear_selection();
    }

    pub fn delete_selected(&self) -> Removal {
        self.topology.lock().delete_selected()
    }

    /// Advisory checks for the current topology
    #[must_use]
    pub fn preflight(&self) -> PreflightReport {
        preflight(&self.snapshot())
    }

    /// Request body a deploy would send right now
    #[must_use]
    pub fn deployment_request(&self) -> DeploymentRequest {
        self.serializer.serialize(&self.snapshot())
    }

    // === Lifecycle ===

    /// Tear the session down. Results of requests still in flight are
    /// dropped when they arrive.
    pub fn shutdown(&self) {
        tracing::debug!("editor shutting down");
        self.alive.store(false, Ordering::SeqCst);
    }

    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    // === Backend sync ===

    /// Fetch persisted state and replace the topology with it
    pub async fn restore(&self) -> RestoreOutcome {
        let pending = match self.begin_restore() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };
        let fetched = self.backend.list_ranges().await;
        self.complete_restore(pending, fetched)
    }

    /// Run [`Self::restore`] on the runtime. The task keeps only a weak
    /// reference while the request is in flight, so dropping the controller
    /// turns the completion into a no-op.
    pub fn spawn_restore(self: &Arc<Self>) -> JoinHandle<RestoreOutcome> {
        let begun = self.begin_restore();
        let backend = Arc::clone(&self.backend);
        let weak = Arc::downgrade(self);

        tokio::spawn(async move {
            let pending = match begun {
                Ok(pending) => pending,
                Err(outcome) => return outcome,
            };
            let fetched = backend.list_ranges().await;
            match weak.upgrade() {
                Some(controller) => controller.complete_restore(pending, fetched),
                None => {
                    tracing::debug!("controller dropped before ranges arrived");
                    RestoreOutcome::ShutDown
                }
            }
        })
    }

    /// Submit the current topology. Local state is never modified, whatever
    /// the outcome.
    ///
    /// # Errors
    /// - `SyncError::ShutDown` after [`Self::shutdown`]
    /// - `SyncError::Busy` while a load or another deploy is in flight
    /// - `SyncError::Backend` if the backend rejects or cannot be reached
    pub async fn deploy(&self) -> Result<DeploymentResponse, SyncError> {
        self.ensure_alive()?;
        let _permit = self.guard.begin(RequestClass::Deploy)?;

        let snapshot = self.snapshot();
        for issue in &preflight(&snapshot).issues {
            tracing::warn!(%issue, "preflight");
        }
        let request = self.serializer.serialize(&snapshot);
        tracing::info!(
            range = %request.range_metadata.id,
            nodes = request.nodes.len(),
            links = request.links.len(),
            "Deploying range"
        );

        match self.backend.deploy(&request).await {
            Ok(response) => {
                tracing::info!(status = %response.status, "Deployment accepted: {}", response.message);
                Ok(response)
            }
            Err(e) => {
                tracing::error!(
                    transport = e.is_transport(),
                    detail = e.detail().unwrap_or_default(),
                    "Deployment failed: {}",
                    e
                );
                Err(e.into())
            }
        }
    }

    /// Delete the persisted range. The local topology is left as it is.
    ///
    /// # Errors
    /// - `SyncError::ShutDown` after [`Self::shutdown`]
    /// - `SyncError::Busy` while a load or deploy is in flight
    /// - `SyncError::Backend` if the backend rejects or cannot be reached
    pub async fn delete_range(&self) -> Result<DeleteResponse, SyncError> {
        self.ensure_alive()?;
        let _permit = self.guard.begin(RequestClass::Deploy)?;

        let range_id = self.reconciler.range_id();
        tracing::info!(range = %range_id, "Deleting range");
        self.backend.delete_range(range_id).await.map_err(|e| {
            tracing::error!("Range deletion failed: {}", e);
            SyncError::from(e)
        })
    }

    /// Admit a load and remember the revision it started from
    fn begin_restore(&self) -> Result<PendingRestore, RestoreOutcome> {
        if !self.is_alive() {
            return Err(RestoreOutcome::ShutDown);
        }
        let permit = self
            .guard
            .begin(RequestClass::Load)
            .map_err(|_| RestoreOutcome::Busy)?;
        let revision = self.topology.lock().revision();
        Ok(PendingRestore {
            _permit: permit,
            revision,
        })
    }

    /// Apply a fetched collection if the session is still live and unedited
    fn complete_restore(
        &self,
        pending: PendingRestore,
        fetched: Result<Vec<Value>, BackendError>,
    ) -> RestoreOutcome {
        if !self.is_alive() {
            tracing::debug!("dropping ranges received after shutdown");
            return RestoreOutcome::ShutDown;
        }

        let snapshots = match fetched {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!("Failed to load state: {}", e);
                return RestoreOutcome::Failed;
            }
        };

        let restoration = match self.reconciler.plan(&snapshots) {
            Ok(Some(restoration)) => restoration,
            Ok(None) => {
                tracing::info!(ranges = snapshots.len(), "No persisted topology, keeping default");
                return RestoreOutcome::NotFound;
            }
            Err(e) => {
                tracing::error!("Failed to load state: {}", e);
                return RestoreOutcome::Failed;
            }
        };

        let mut topology = self.topology.lock();
        if topology.revision() != pending.revision {
            tracing::warn!(
                started = pending.revision,
                current = topology.revision(),
                "Topology edited during load, discarding persisted state"
            );
            return RestoreOutcome::Stale;
        }

        tracing::info!(status = ?restoration.status, "Restoring previous topology");
        let (nodes, edges) = restoration.apply_to(&mut topology);
        RestoreOutcome::Restored { nodes, edges }
    }

    fn ensure_alive(&self) -> Result<(), SyncError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(SyncError::ShutDown)
        }
    }
}
