//! Collaborator seam for the underlying connection layer.
//!
//! Socket/TLS lifecycle, stanza correlation, and authentication mechanisms
//! live below this trait; the rebind/push core only needs the handful of
//! primitives defined here.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors surfaced by the transport collaborator
#[derive(Error, Debug)]
pub enum TransportError {
    /// The connection is not established
    #[error("not connected")]
    NotConnected,

    /// The correlated request/response wait elapsed
    #[error("no response within the transport timeout")]
    NoResponse,

    /// Socket-level failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication was rejected
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
}

/// Response to a correlated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IqResponse {
    /// The server acknowledged the request
    Result,
    /// The server answered with an error condition
    Error(String),
}

/// Which path established the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPath {
    /// A previous session was re-attached without authenticating
    Resumed,
    /// A full authentication round established a new session
    Authenticated,
}

/// Primitives the rebind/push core consumes from the connection layer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request payload and wait for the correlated response, bounded
    /// by the transport's own response timeout
    async fn send_request(&self, payload: Bytes) -> Result<IqResponse, TransportError>;

    /// Send a top-level protocol element without waiting for a reply
    async fn send_element(&self, payload: Bytes) -> Result<(), TransportError>;

    /// Write raw bytes to the transport, bypassing stanza framing
    async fn write_raw(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Whether the peer advertised the given stream feature
    fn has_feature(&self, element: &str, namespace: &str) -> bool;

    /// Run the full authentication sequence
    async fn authenticate(&self) -> Result<(), TransportError>;

    /// Post-login hook, invoked on both the resumed and authenticated paths
    async fn after_login(&self, path: LoginPath);

    /// Stream identifier assigned by the server after authentication
    fn stream_id(&self) -> Option<String>;

    /// Full jid bound to this connection after authentication
    fn local_jid(&self) -> Option<String>;
}
