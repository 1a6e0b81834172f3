//! Connection-level orchestration of rebind, push, and keepalive.

use crate::config::ClientConfig;
use crate::error::{PushError, SessionError};
use crate::keepalive::WhitespacePinger;
use crate::negotiator::RebindNegotiator;
use crate::push::PushManager;
use crate::state::{PushState, SessionHandle};
use crate::transport::{LoginPath, Transport};
use bytes::Bytes;
use p1_stream::{RebindInterceptor, ResumeRendezvous, TokenRead};
use p1_wire::push::PushConfig;
use p1_wire::{RebindOutcome, ReplyRegistry, FEATURE_ELEMENT, REBIND_NAMESPACE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// A client connection with rebind and push support layered on top of the
/// transport collaborator.
///
/// Login is serialized per connection: one resume-or-authenticate sequence
/// runs at a time, so a single rebind request can be outstanding and the
/// session handle is never raced.
pub struct Connection {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    handle: Arc<RwLock<SessionHandle>>,
    push_state: Arc<RwLock<PushState>>,
    rebind_available: RwLock<bool>,
    rendezvous: Arc<ResumeRendezvous>,
    registry: Arc<ReplyRegistry>,
    negotiator: RebindNegotiator,
    push: PushManager,
    pinger: Arc<WhitespacePinger>,
    login_gate: Mutex<()>,
}

impl Connection {
    /// Create a connection over the given transport
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        let handle = Arc::new(RwLock::new(SessionHandle::default()));
        let push_state = Arc::new(RwLock::new(PushState {
            enabled: false,
            ping_timeout: config.ping_interval(),
        }));
        let rendezvous = Arc::new(ResumeRendezvous::new());
        let registry = Arc::new(ReplyRegistry::with_builtin());
        let pinger = WhitespacePinger::new(Arc::clone(&transport), Arc::clone(&push_state));
        let negotiator =
            RebindNegotiator::new(Arc::clone(&rendezvous), config.response_interval());
        let push = PushManager::new(
            Arc::clone(&transport),
            Arc::clone(&push_state),
            Arc::clone(&pinger),
        );

        Self {
            transport,
            config,
            handle,
            push_state,
            rebind_available: RwLock::new(false),
            rendezvous,
            registry,
            negotiator,
            push,
            pinger,
            login_gate: Mutex::new(()),
        }
    }

    /// Decorate the connection's inbound token reader so rebind replies are
    /// routed to the login context instead of stanza dispatch
    pub fn wrap_reader<R: TokenRead>(&self, reader: R) -> RebindInterceptor<R> {
        RebindInterceptor::new(
            reader,
            Arc::clone(&self.registry),
            Arc::clone(&self.rendezvous),
        )
    }

    /// Seed resumption state gathered from a previous connection.
    ///
    /// Reusing the same `Connection` after a disconnect keeps its state; this
    /// is only needed when the pair was persisted externally.
    pub async fn set_rebind_state(&self, jid: impl Into<String>, sid: impl Into<String>) {
        *self.handle.write().await = SessionHandle::resumable(jid, sid);
    }

    /// Jid to persist for a later rebind
    pub async fn rebind_jid(&self) -> String {
        self.handle.read().await.jid.clone()
    }

    /// Stream id to persist for a later rebind
    pub async fn rebind_sid(&self) -> Option<String> {
        self.handle.read().await.stream_id.clone()
    }

    /// Change the whitespace keepalive interval; 0 disables.
    ///
    /// Takes effect at the next reschedule.
    pub async fn set_whitespace_ping_time(&self, seconds: u32) {
        self.push_state.write().await.ping_timeout = Duration::from_secs(u64::from(seconds));
    }

    /// Whether a resume will be attempted on the next login: the peer
    /// advertised rebind, a session id is stored, and the policy allows it.
    ///
    /// Recomputed from live state on every call, never cached.
    pub async fn resume_eligible(&self) -> bool {
        self.config.use_rebind
            && *self.rebind_available.read().await
            && self.handle.read().await.is_resumable()
    }

    /// Establish the session: resume the previous one when eligible,
    /// otherwise run full authentication.
    ///
    /// A failed or timed-out resume clears the stored resumption state and
    /// falls through to authentication; it never fails the login by itself.
    pub async fn login(&self) -> Result<LoginPath, SessionError> {
        let _gate = self.login_gate.lock().await;

        let advertised = self
            .transport
            .has_feature(FEATURE_ELEMENT, REBIND_NAMESPACE);
        *self.rebind_available.write().await = advertised;

        if self.resume_eligible().await {
            let (jid, sid) = {
                let handle = self.handle.read().await;
                (
                    handle.jid.clone(),
                    handle.stream_id.clone().unwrap_or_default(),
                )
            };

            match self
                .negotiator
                .attempt_resume(self.transport.as_ref(), &jid, &sid)
                .await
            {
                RebindOutcome::Resumed => {
                    info!("session rebound, skipping authentication");
                    self.after_successful_login(LoginPath::Resumed).await;
                    return Ok(LoginPath::Resumed);
                }
                RebindOutcome::NotResumed { reason } => {
                    debug!(
                        ?reason,
                        "rebind failed, continuing with normal stream establishment"
                    );
                    self.drop_rebind_state().await;
                }
            }
        } else if advertised {
            debug!("rebind advertised but no stored session to resume");
        }

        self.transport
            .authenticate()
            .await
            .map_err(SessionError::Authentication)?;
        self.after_successful_login(LoginPath::Authenticated).await;
        Ok(LoginPath::Authenticated)
    }

    /// Forget the stored resumption state. Idempotent.
    async fn drop_rebind_state(&self) {
        self.handle.write().await.clear_resumption();
        *self.rebind_available.write().await = false;
    }

    async fn after_successful_login(&self, path: LoginPath) {
        match path {
            LoginPath::Resumed => {
                self.push_state.write().await.enabled = true;
            }
            LoginPath::Authenticated => {
                let mut handle = self.handle.write().await;
                if let Some(jid) = self.transport.local_jid() {
                    handle.jid = jid;
                }
                handle.stream_id = self.transport.stream_id();
                drop(handle);
                self.push_state.write().await.enabled = false;
            }
        }
        self.pinger.reschedule().await;
        self.transport.after_login(path).await;
    }

    /// Send a top-level element (stanza or protocol control), rescheduling
    /// the keepalive first so active traffic debounces whitespace pings
    pub async fn send_element(&self, payload: Bytes) -> Result<(), SessionError> {
        self.pinger.reschedule().await;
        self.transport
            .send_element(payload)
            .await
            .map_err(SessionError::Transport)
    }

    /// Enable push delivery for this session
    pub async fn enable_push(&self, config: &PushConfig) -> Result<bool, PushError> {
        self.push.enable(config).await
    }

    /// Disable push delivery
    pub async fn disable_push(&self) -> Result<(), PushError> {
        self.push.disable().await
    }

    /// Whether push delivery is currently enabled
    pub async fn is_push_enabled(&self) -> bool {
        self.push.is_enabled().await
    }
}
