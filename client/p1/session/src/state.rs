//! Session identity and push state.

use std::time::Duration;

/// Identity of a resumable session.
///
/// `stream_id` is the opaque identifier the server assigned to a live
/// session; `None` means the session cannot be resumed. Persisting the pair
/// across process restarts is the caller's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHandle {
    /// Address of the session endpoint
    pub jid: String,
    /// Identifier of the previous live session, when resumable
    pub stream_id: Option<String>,
}

impl SessionHandle {
    /// Create a handle with no resumable session
    pub fn new(jid: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            stream_id: None,
        }
    }

    /// Create a handle naming a resumable session
    pub fn resumable(jid: impl Into<String>, stream_id: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            stream_id: Some(stream_id.into()),
        }
    }

    /// Whether this handle names a session that can be resumed
    pub fn is_resumable(&self) -> bool {
        self.stream_id.is_some()
    }

    /// Forget the resumable session. Idempotent.
    pub fn clear_resumption(&mut self) {
        self.stream_id = None;
    }
}

/// Push enablement state for the connection.
#[derive(Debug, Clone)]
pub struct PushState {
    /// Whether push delivery is currently enabled
    pub enabled: bool,
    /// Whitespace keepalive interval; zero disables the pinger
    pub ping_timeout: Duration,
}

impl Default for PushState {
    fn default() -> Self {
        Self {
            enabled: false,
            ping_timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resumable_handle() {
        let handle = SessionHandle::resumable("a@b/c", "stream-123");
        assert!(handle.is_resumable());
        assert_eq!(handle.stream_id.as_deref(), Some("stream-123"));

        let fresh = SessionHandle::new("a@b/c");
        assert!(!fresh.is_resumable());
    }

    #[test]
    fn test_clear_resumption_is_idempotent() {
        let mut handle = SessionHandle::resumable("a@b/c", "stream-123");

        handle.clear_resumption();
        let once = handle.clone();
        handle.clear_resumption();

        assert_eq!(handle, once);
        assert!(!handle.is_resumable());
    }
}
