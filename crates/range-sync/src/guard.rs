//! Single-in-flight request guard
//!
//! At most one request per class is in flight. Loads and deploys also
//! exclude each other: a deploy issued before the initial load lands would
//! overwrite the persisted range with the default graph, and a load racing a
//! deploy would restore whatever the backend had before it.
//!
//! Each admitted request gets a [`Permit`] carrying a sequenced
//! [`RequestTicket`]. Dropping the permit releases the slot, so a cancelled
//! or failed request never leaves the guard stuck.

use crate::error::SyncError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Operation class sharing one in-flight slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestClass {
    /// Fetching persisted state
    Load,
    /// Writing to the backend (deploy, delete)
    Deploy,
}

impl RequestClass {
    /// Class that may not run concurrently with this one
    #[inline]
    #[must_use]
    pub fn conflicting(self) -> RequestClass {
        match self {
            RequestClass::Load => RequestClass::Deploy,
            RequestClass::Deploy => RequestClass::Load,
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestClass::Load => f.write_str("load"),
            RequestClass::Deploy => f.write_str("deploy"),
        }
    }
}

/// Identity of one admitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket {
    pub class: RequestClass,
    /// Shared across classes, strictly increasing
    pub seq: u64,
}

#[derive(Debug, Default)]
struct Slots {
    next_seq: u64,
    load: Option<u64>,
    deploy: Option<u64>,
}

impl Slots {
    fn slot(&mut self, class: RequestClass) -> &mut Option<u64> {
        match class {
            RequestClass::Load => &mut self.load,
            RequestClass::Deploy => &mut self.deploy,
        }
    }
}

/// Admission control for backend requests
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    slots: Arc<Mutex<Slots>>,
}

impl SyncGuard {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `class`
    ///
    /// # Errors
    /// - `SyncError::Busy` if the class or its conflicting class is in flight
    pub fn begin(&self, class: RequestClass) -> Result<Permit, SyncError> {
        let mut slots = self.slots.lock();

        for blocking in [class, class.conflicting()] {
            if slots.slot(blocking).is_some() {
                tracing::warn!(%class, %blocking, "request refused, slot busy");
                return Err(SyncError::Busy { class, blocking });
            }
        }

        let seq = slots.next_seq;
        slots.next_seq += 1;
        *slots.slot(class) = Some(seq);

        Ok(Permit {
            slots: Arc::clone(&self.slots),
            ticket: RequestTicket { class, seq },
        })
    }

    #[must_use]
    pub fn in_flight(&self, class: RequestClass) -> Option<RequestTicket> {
        let seq = *self.slots.lock().slot(class);
        seq.map(|seq| RequestTicket { class, seq })
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        let slots = self.slots.lock();
        slots.load.is_none() && slots.deploy.is_none()
    }
}

/// Held for the lifetime of an admitted request
#[derive(Debug)]
pub struct Permit {
    slots: Arc<Mutex<Slots>>,
    ticket: RequestTicket,
}

impl Permit {
    #[inline]
    #[must_use]
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        let slot = slots.slot(self.ticket.class);
        if *slot == Some(self.ticket.seq) {
            *slot = None;
        }
    }
}
