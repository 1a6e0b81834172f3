//! Session rebind, push enablement, and whitespace keepalive for a
//! streaming client connection.
//!
//! This crate layers three cooperating capabilities over a transport
//! collaborator:
//!
//! - **Rebind**: re-attach to a previous session by `{jid, sid}` instead of
//!   re-authenticating, with the out-of-band server reply intercepted from
//!   the inbound token stream.
//! - **Push**: enable/disable mobile push delivery over the correlated
//!   request/response primitive.
//! - **Keepalive**: a self-rescheduling whitespace ping that keeps the
//!   transport alive while push is enabled, debounced by ordinary traffic.
//!
//! ## Example
//!
//! ```rust,no_run
//! use p1_session::{ClientConfig, Connection, Transport};
//! use std::sync::Arc;
//!
//! # async fn example(transport: Arc<dyn Transport>) -> anyhow::Result<()> {
//! let connection = Connection::new(transport, ClientConfig::default());
//!
//! // Seed state persisted from a previous session, then log in: the
//! // connection resumes when the server allows it and falls back to full
//! // authentication otherwise.
//! connection.set_rebind_state("user@example.com/mobile", "sid-1").await;
//! let path = connection.login().await?;
//! println!("logged in via {path:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod error;
pub mod keepalive;
pub mod negotiator;
pub mod push;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testutil;

// Re-export main types
pub use config::ClientConfig;
pub use connection::Connection;
pub use error::{PushError, SessionError};
pub use keepalive::WhitespacePinger;
pub use negotiator::RebindNegotiator;
pub use push::PushManager;
pub use state::{PushState, SessionHandle};
pub use transport::{IqResponse, LoginPath, Transport, TransportError};
