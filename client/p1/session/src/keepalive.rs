//! Whitespace keepalive scheduling.

use crate::state::PushState;
use crate::transport::Transport;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

/// The cheapest byte sequence the transport treats as liveness
const WHITESPACE_PING: &[u8] = b"\n";

/// Self-rescheduling whitespace keepalive.
///
/// At most one timer task is pending at a time. `reschedule` aborts the
/// pending shot and arms a new one measured from now, so every outbound
/// transmission pushes the next keepalive out; the timer only fires after a
/// full quiet interval. When the shot fires it writes a single whitespace
/// byte best-effort and re-arms itself. The fire path re-arms without
/// aborting (the slot holds its own handle); if a send-path reschedule races
/// the fire, the duplicate whitespace write is harmless.
///
/// Nothing is ever armed while push is disabled or the interval is zero.
pub struct WhitespacePinger {
    transport: Arc<dyn Transport>,
    state: Arc<RwLock<PushState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl WhitespacePinger {
    /// Create a pinger writing through the given transport
    pub fn new(transport: Arc<dyn Transport>, state: Arc<RwLock<PushState>>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            state,
            pending: Mutex::new(None),
        })
    }

    /// Cancel the pending shot and arm a new one, if push is enabled.
    ///
    /// Cancellation is unconditional and idempotent; aborting a timer that
    /// already fired or was never armed is a no-op.
    pub async fn reschedule(self: &Arc<Self>) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *pending = self.arm().await;
    }

    /// Re-arm from the fire path without aborting the slot, which at that
    /// point holds the firing task's own handle.
    ///
    /// Returns a concrete boxed `Send` future rather than an `async fn`'s
    /// opaque type: the re-arm recurses back through `arm`, which spawns
    /// another task that calls `rearm`, and the auto-trait inference for that
    /// cycle only resolves when one hop is anchored to a concrete `Send` type.
    fn rearm(self: &Arc<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let this = Arc::clone(self);
        Box::pin(async move {
            let mut pending = this.pending.lock().await;
            pending.take();
            *pending = this.arm().await;
        })
    }

    async fn arm(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let state = self.state.read().await;
        if !state.enabled || state.ping_timeout.is_zero() {
            return None;
        }
        let delay = state.ping_timeout;
        drop(state);

        let pinger = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = pinger.transport.write_raw(WHITESPACE_PING).await {
                debug!("whitespace keepalive write failed: {e}");
            }
            pinger.rearm().await;
        }))
    }
}
