//! Token-level XML stream reading with inline rebind reply interception.
//!
//! The connection's reader loop pulls [`XmlToken`]s from a [`TokenRead`]
//! source. Wrapping that source in a [`RebindInterceptor`] lets the rebind
//! replies a server interleaves into the stream be routed to the waiting
//! login context through a [`ResumeRendezvous`], while every other token is
//! forwarded to ordinary dispatch unchanged.
//!
//! ## Reading contexts
//!
//! - the reader context owns the token source and is the sole producer of
//!   rebind outcomes;
//! - the login context blocks on the rendezvous with a bounded wait and is
//!   the sole consumer.
//!
//! The rendezvous never blocks the producer: outcomes delivered while no
//! request is outstanding are dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod interceptor;
pub mod reader;
pub mod rendezvous;
pub mod token;

// Re-export main types
pub use error::StreamError;
pub use interceptor::RebindInterceptor;
pub use reader::XmlTokenReader;
pub use rendezvous::ResumeRendezvous;
pub use token::{TokenRead, XmlToken};
