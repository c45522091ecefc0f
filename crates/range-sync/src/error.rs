//! Error types for backend synchronization
//!
//! - Transport and HTTP status failures talking to the backend
//! - Requests refused by the in-flight guard
//! - Requests made after the editor shut down

use crate::guard::RequestClass;

/// Generic notice shown to the user when a deployment fails
pub const DEPLOY_FAILED_NOTICE: &str = "Deployment failed. Check the backend logs for details.";

/// Errors talking to the range backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, timeout or protocol failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Connection to the backend could not be established
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Status error with the backend's detail text
    #[inline]
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: detail.into(),
        }
    }

    /// Client-side failure of a request
    ///
    /// - `Transport` for any error raised by the HTTP client, except a
    ///   failed connect, which becomes `Unavailable`
    #[must_use]
    pub fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Transport(err)
        }
    }

    /// Check if the request never got an answer
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable(_))
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Detail reported by the backend, if it answered
    #[inline]
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

/// Errors from the editor's sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Another request holds a conflicting slot
    #[error("{class} refused: {blocking} request in flight")]
    Busy {
        class: RequestClass,
        blocking: RequestClass,
    },

    /// Editor was torn down
    #[error("editor is shut down")]
    ShutDown,

    /// Backend request failed
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl SyncError {
    /// Text for the user-facing failure notice
    #[inline]
    #[must_use]
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "Another sync with the backend is still running.",
            Self::ShutDown => "The editor has been closed.",
            Self::Backend(_) => DEPLOY_FAILED_NOTICE,
        }
    }
}
