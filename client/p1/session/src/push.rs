//! Push enablement over the correlated request/response primitive.

use crate::error::PushError;
use crate::keepalive::WhitespacePinger;
use crate::state::PushState;
use crate::transport::{IqResponse, Transport};
use p1_wire::push::{disable_xml, PushConfig};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Toggles push delivery for the session.
///
/// Enablement flips [`PushState::enabled`] only when the server acknowledges
/// the request; disablement flips it off unconditionally once the exchange
/// completes, even when the server answered with an error — the session is
/// no longer in out-of-reception mode either way.
pub struct PushManager {
    transport: Arc<dyn Transport>,
    state: Arc<RwLock<PushState>>,
    pinger: Arc<WhitespacePinger>,
}

impl PushManager {
    /// Create a manager sharing the connection's push state and pinger
    pub fn new(
        transport: Arc<dyn Transport>,
        state: Arc<RwLock<PushState>>,
        pinger: Arc<WhitespacePinger>,
    ) -> Self {
        Self {
            transport,
            state,
            pinger,
        }
    }

    /// Enable push delivery with the given configuration.
    ///
    /// Returns `Ok(true)` once the server acknowledges; an explicit error
    /// response surfaces as [`PushError::Rejected`] and leaves the push
    /// state unchanged.
    pub async fn enable(&self, config: &PushConfig) -> Result<bool, PushError> {
        let payload = config.to_xml()?;

        self.pinger.reschedule().await;
        match self.transport.send_request(payload).await? {
            IqResponse::Result => {
                self.state.write().await.enabled = true;
                self.pinger.reschedule().await;
                info!(
                    keepalive = config.keepalive,
                    session = config.session,
                    "push enabled"
                );
                Ok(true)
            }
            IqResponse::Error(condition) => {
                warn!("server rejected push enable: {condition}");
                Err(PushError::Rejected(condition))
            }
        }
    }

    /// Disable push delivery.
    ///
    /// Push state is forced off and the keepalive disarmed regardless of the
    /// server's answer; a rejection or transport failure is still surfaced.
    pub async fn disable(&self) -> Result<(), PushError> {
        self.pinger.reschedule().await;
        let exchange = self.transport.send_request(disable_xml()).await;

        self.state.write().await.enabled = false;
        self.pinger.reschedule().await;

        match exchange {
            Ok(IqResponse::Result) => {
                info!("push disabled");
                Ok(())
            }
            Ok(IqResponse::Error(condition)) => {
                warn!("server rejected push disable: {condition}");
                Err(PushError::Rejected(condition))
            }
            Err(e) => Err(PushError::Transport(e)),
        }
    }

    /// Whether push delivery is currently enabled
    pub async fn is_enabled(&self) -> bool {
        self.state.read().await.enabled
    }
}
