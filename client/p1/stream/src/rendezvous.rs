//! Single-slot handoff between the reader and login contexts.

use p1_wire::RebindOutcome;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Single-slot, single-use rendezvous for the rebind outcome.
///
/// The login context arms the slot before sending a rebind request and awaits
/// the returned receiver under its own timeout. The reader context delivers
/// at most one outcome; delivery consumes the armed sender, so a second
/// delivery for the same request is dropped. Delivering while no request is
/// outstanding never blocks the reader — the outcome is discarded.
#[derive(Debug, Default)]
pub struct ResumeRendezvous {
    slot: Mutex<Option<oneshot::Sender<RebindOutcome>>>,
}

impl ResumeRendezvous {
    /// Create an unarmed rendezvous
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot for one outstanding request.
    ///
    /// Any previously armed sender is replaced, closing its receiver.
    pub fn arm(&self) -> oneshot::Receiver<RebindOutcome> {
        let (tx, rx) = oneshot::channel();
        let mut slot = self.slot.lock().expect("rendezvous lock poisoned");
        *slot = Some(tx);
        rx
    }

    /// Clear the slot so a late delivery is ignored.
    ///
    /// Idempotent; called by the consumer on timeout.
    pub fn disarm(&self) {
        let mut slot = self.slot.lock().expect("rendezvous lock poisoned");
        *slot = None;
    }

    /// Whether a request is currently outstanding
    pub fn is_armed(&self) -> bool {
        self.slot.lock().expect("rendezvous lock poisoned").is_some()
    }

    /// Deliver the outcome to the waiting consumer, if any.
    ///
    /// Returns true when a consumer was armed and the outcome was handed
    /// over; false when the outcome was dropped.
    pub fn deliver(&self, outcome: RebindOutcome) -> bool {
        let sender = self.slot.lock().expect("rendezvous lock poisoned").take();
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => {
                debug!(?outcome, "dropping rebind outcome with no request outstanding");
                false
            }
        }
    }
}
