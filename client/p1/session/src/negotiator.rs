//! Rebind negotiation.

use crate::transport::Transport;
use p1_stream::ResumeRendezvous;
use p1_wire::{RebindOutcome, RebindSession};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Drives one resume-or-fall-through attempt per login.
///
/// The attempt moves through three states: idle (rendezvous unarmed),
/// awaiting the out-of-band reply (armed, request sent), and a terminal
/// outcome. Exactly one request is sent per attempt and exactly one outcome
/// is produced; a timeout disarms the rendezvous before resolving so a late
/// reply from the reader context is dropped rather than delivered to a
/// finished attempt.
pub struct RebindNegotiator {
    rendezvous: Arc<ResumeRendezvous>,
    reply_timeout: Duration,
}

impl RebindNegotiator {
    /// Create a negotiator delivering through the given rendezvous
    pub fn new(rendezvous: Arc<ResumeRendezvous>, reply_timeout: Duration) -> Self {
        Self {
            rendezvous,
            reply_timeout,
        }
    }

    /// Attempt to resume the session named by `jid`/`sid`.
    ///
    /// Never fails: every problem on this path resolves to `NotResumed`,
    /// which the caller answers with full authentication.
    pub async fn attempt_resume(
        &self,
        transport: &dyn Transport,
        jid: &str,
        sid: &str,
    ) -> RebindOutcome {
        let receiver = self.rendezvous.arm();

        let request = match RebindSession::new(jid, sid).to_xml() {
            Ok(request) => request,
            Err(e) => {
                self.rendezvous.disarm();
                warn!("failed to encode rebind request: {e}");
                return RebindOutcome::NotResumed { reason: None };
            }
        };

        debug!(jid, sid, "sending rebind request");
        if let Err(e) = transport.send_element(request).await {
            self.rendezvous.disarm();
            warn!("failed to send rebind request: {e}");
            return RebindOutcome::NotResumed { reason: None };
        }

        match tokio::time::timeout(self.reply_timeout, receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                // Producer side went away without delivering.
                self.rendezvous.disarm();
                RebindOutcome::NotResumed { reason: None }
            }
            Err(_) => {
                self.rendezvous.disarm();
                debug!("rebind reply did not arrive in time");
                RebindOutcome::NotResumed { reason: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{IqResponse, LoginPath, TransportError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Bytes>>,
        fail_sends: bool,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send_request(&self, _payload: Bytes) -> Result<IqResponse, TransportError> {
            Ok(IqResponse::Result)
        }

        async fn send_element(&self, payload: Bytes) -> Result<(), TransportError> {
            if self.fail_sends {
                return Err(TransportError::NotConnected);
            }
            self.sent.lock().unwrap().push(payload);
            Ok(())
        }

        async fn write_raw(&self, _bytes: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        fn has_feature(&self, _element: &str, _namespace: &str) -> bool {
            true
        }

        async fn authenticate(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn after_login(&self, _path: LoginPath) {}

        fn stream_id(&self) -> Option<String> {
            None
        }

        fn local_jid(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_outcome_delivered_while_awaiting() {
        let rendezvous = Arc::new(ResumeRendezvous::new());
        let negotiator =
            RebindNegotiator::new(Arc::clone(&rendezvous), Duration::from_secs(5));
        let transport = RecordingTransport::default();

        let delivery = {
            let rendezvous = Arc::clone(&rendezvous);
            tokio::spawn(async move {
                // Wait until the request is outstanding, then answer it.
                while !rendezvous.is_armed() {
                    tokio::task::yield_now().await;
                }
                rendezvous.deliver(RebindOutcome::Resumed);
            })
        };

        let outcome = negotiator
            .attempt_resume(&transport, "a@b/c", "stream-123")
            .await;
        delivery.await.unwrap();

        assert_eq!(outcome, RebindOutcome::Resumed);
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let rendered = std::str::from_utf8(&sent[0]).unwrap();
        assert!(rendered.contains("<jid>a@b/c</jid>"));
        assert!(rendered.contains("<sid>stream-123</sid>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_disarms_and_falls_through() {
        let rendezvous = Arc::new(ResumeRendezvous::new());
        let negotiator =
            RebindNegotiator::new(Arc::clone(&rendezvous), Duration::from_secs(5));
        let transport = RecordingTransport::default();

        let outcome = negotiator
            .attempt_resume(&transport, "a@b/c", "stream-123")
            .await;

        assert_eq!(outcome, RebindOutcome::NotResumed { reason: None });
        // A late failure reply finds nothing outstanding.
        assert!(!rendezvous.is_armed());
        assert!(!rendezvous.deliver(RebindOutcome::NotResumed {
            reason: Some("late".to_string())
        }));
    }

    #[tokio::test]
    async fn test_send_failure_resolves_not_resumed() {
        let rendezvous = Arc::new(ResumeRendezvous::new());
        let negotiator =
            RebindNegotiator::new(Arc::clone(&rendezvous), Duration::from_secs(5));
        let transport = RecordingTransport {
            fail_sends: true,
            ..Default::default()
        };

        let outcome = negotiator
            .attempt_resume(&transport, "a@b/c", "stream-123")
            .await;

        assert_eq!(outcome, RebindOutcome::NotResumed { reason: None });
        assert!(!rendezvous.is_armed());
    }
}
