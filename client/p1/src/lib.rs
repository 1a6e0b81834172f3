//! Client-side session rebind, push enablement, and whitespace keepalive.
//!
//! Re-exports the full public surface of the workspace crates:
//!
//! - [`wire`]: `p1:rebind`/`p1:push` element shapes and the reply registry
//! - [`stream`]: token-level reading and inline rebind reply interception
//! - [`session`]: connection orchestration, push state, keepalive scheduling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use p1_session as session;
pub use p1_stream as stream;
pub use p1_wire as wire;

pub use p1_session::{
    ClientConfig, Connection, IqResponse, LoginPath, PushError, PushManager, PushState,
    SessionError, SessionHandle, Transport, TransportError, WhitespacePinger,
};
pub use p1_stream::{RebindInterceptor, ResumeRendezvous, TokenRead, XmlToken, XmlTokenReader};
pub use p1_wire::{FromPolicy, PushConfig, RebindOutcome, ReplyRegistry, SendPolicy};
