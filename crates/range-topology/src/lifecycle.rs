//! Graph lifecycle
//!
//! `Initialized` is the fresh one-node graph. Any edit moves to `Edited`, a
//! successful load to `Restored`. `Restored` behaves exactly like `Edited`.
//! Deploying never changes the phase and nothing returns to `Initialized`.

/// Lifecycle phase of a topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphPhase {
    /// Master node only, untouched
    #[default]
    Initialized,
    /// Changed through an editing operation
    Edited,
    /// Replaced from a backend snapshot
    Restored,
}

/// Events that drive the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    /// add / connect / update / delete
    Edit,
    /// Snapshot applied
    Restore,
}

impl GraphPhase {
    /// Phase after `event`. Every phase accepts both events, and no event
    /// leads back to `Initialized`.
    #[inline]
    #[must_use]
    pub fn on(self, event: GraphEvent) -> GraphPhase {
        match event {
            GraphEvent::Edit => GraphPhase::Edited,
            GraphEvent::Restore => GraphPhase::Restored,
        }
    }

    /// Whether the graph is still the untouched default
    #[inline]
    #[must_use]
    pub fn is_pristine(self) -> bool {
        matches!(self, GraphPhase::Initialized)
    }
}
