//! Error types for the topology model
//!
//! - Graph edits that reference records not present in the topology
//! - Snapshot decoding failures during reconciliation

use crate::types::{EdgeId, NodeId};

/// Errors raised by topology edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// Connection endpoint is not in the graph
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Record replacement for an edge that is not in the graph
    #[error("unknown edge: {0}")]
    UnknownEdge(EdgeId),
}

/// Errors raised while rebuilding a topology from backend state
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The matching snapshot is missing fields or carries invalid values
    #[error("malformed snapshot {range_id}: {source}")]
    MalformedSnapshot {
        range_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReconcileError {
    /// Create malformed snapshot error
    #[inline]
    pub fn malformed(range_id: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedSnapshot {
            range_id: range_id.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_error_display() {
        let err = TopologyError::UnknownNode(NodeId::new("ghost"));
        assert_eq!(err.to_string(), "unknown node: ghost");
    }

    #[test]
    fn malformed_snapshot_display() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ReconcileError::malformed("r1", source);
        assert!(err.to_string().starts_with("malformed snapshot r1"));
    }
}
