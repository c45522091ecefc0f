//! Backend abstraction
//!
//! The editor talks to the orchestration backend only through
//! [`RangeBackend`]. [`crate::HttpRangeBackend`] is the production
//! implementation; tests substitute fakes or mocks.

use crate::error::BackendError;
use async_trait::async_trait;
use range_topology::{DeleteResponse, DeploymentRequest, DeploymentResponse};
use serde_json::Value;

/// Remote persistence and provisioning authority for ranges
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RangeBackend: Send + Sync {
    /// Every persisted range snapshot, undecoded
    async fn list_ranges(&self) -> Result<Vec<Value>, BackendError>;

    /// Submit a topology for provisioning
    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentResponse, BackendError>;

    /// Tear down a persisted range
    async fn delete_range(&self, range_id: &str) -> Result<DeleteResponse, BackendError>;
}
