//! Range Sync - keeps the editor's topology in step with the backend
//!
//! - [`RangeBackend`]: the backend seam, with [`HttpRangeBackend`] as the
//!   production client
//! - [`SyncGuard`]: single-in-flight admission for load and deploy
//! - [`EditorController`]: owns the topology and runs restore, deploy and
//!   delete against a backend

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod guard;
pub mod http;

pub use backend::RangeBackend;
pub use config::{ClientConfig, API_PREFIX, DEFAULT_BASE_URL};
pub use controller::{EditorController, RestoreOutcome};
pub use error::{BackendError, SyncError, DEPLOY_FAILED_NOTICE};
pub use guard::{Permit, RequestClass, RequestTicket, SyncGuard};
pub use http::HttpRangeBackend;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
