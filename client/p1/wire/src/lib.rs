//! Wire shapes for the `p1:rebind` and `p1:push` protocol namespaces.
//!
//! This crate renders the handful of XML elements the rebind/push core emits
//! and models the two out-of-band rebind replies a server can interleave into
//! the inbound stream. Ordinary stanza encoding lives with the connection
//! layer; only the shapes owned by this extension are built here.
//!
//! ## Elements
//!
//! ```text
//! <rebind xmlns='p1:rebind'><jid>J</jid><sid>S</sid></rebind>   rebind request
//! <rebind xmlns='p1:rebind'/>                                    rebind success
//! <failure xmlns='p1:rebind'>reason</failure>                    rebind failure
//! <push xmlns='p1:push' apns-sandbox='false'>...</push>          push enable
//! <disable xmlns='p1:push'/>                                     push disable
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod push;
pub mod rebind;
pub mod registry;

// Re-export main types
pub use error::WireError;
pub use push::{FromPolicy, PushConfig, SendPolicy, PUSH_NAMESPACE};
pub use rebind::{
    RebindOutcome, RebindSession, FEATURE_ELEMENT, FAILURE_ELEMENT, REBIND_NAMESPACE,
};
pub use registry::{ReplyKind, ReplyRegistry};
