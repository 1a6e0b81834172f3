//! Session error types.
//!
//! Resumption-specific failures are never surfaced as errors: a timed-out,
//! rejected, or malformed rebind resolves to a `NotResumed` outcome and the
//! login continues with full authentication. Only push request failures and
//! authentication failures from the fallback path reach the caller.

use crate::transport::TransportError;
use p1_wire::WireError;
use thiserror::Error;

/// Errors surfaced by the login and send paths
#[derive(Error, Debug)]
pub enum SessionError {
    /// The fallback authentication sequence failed
    #[error("authentication failed: {0}")]
    Authentication(#[source] TransportError),

    /// Transport failure outside the resumption path
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A wire shape could not be encoded
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Errors surfaced by push enable/disable requests
#[derive(Error, Debug)]
pub enum PushError {
    /// The server answered the request with an error condition
    #[error("push request rejected: {0}")]
    Rejected(String),

    /// The request could not be delivered or timed out
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The enable payload could not be encoded
    #[error(transparent)]
    Wire(#[from] WireError),
}
