//! The `p1:rebind` element family and the rebind outcome type.
//!
//! A rebind request names a previous session by `{jid, sid}`; the server
//! answers out of band with either an empty `<rebind/>` acknowledgment or a
//! `<failure>` carrying an optional free-text reason. Both replies arrive as
//! direct children of the stream root, interleaved with ordinary stanzas.

use crate::error::WireError;
use bytes::Bytes;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Namespace of the rebind protocol
pub const REBIND_NAMESPACE: &str = "p1:rebind";

/// Element name of the rebind feature, request, and success reply
pub const FEATURE_ELEMENT: &str = "rebind";

/// Element name of the rebind failure reply
pub const FAILURE_ELEMENT: &str = "failure";

/// Terminal result of a rebind attempt.
///
/// Produced at most once per outstanding request; a timed-out or failed
/// attempt downgrades to full authentication, it never aborts the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebindOutcome {
    /// The server re-attached the previous session; authentication is skipped
    Resumed,
    /// The session was not resumed; proceed with normal authentication
    NotResumed {
        /// Free-text reason from the failure reply, when the server sent one
        reason: Option<String>,
    },
}

impl RebindOutcome {
    /// Whether this outcome resumed the previous session
    pub fn is_resumed(&self) -> bool {
        matches!(self, RebindOutcome::Resumed)
    }
}

/// Rebind request naming the session to re-attach
#[derive(Debug, Clone)]
pub struct RebindSession {
    jid: String,
    sid: String,
}

impl RebindSession {
    /// Create a rebind request for the session identified by `jid`/`sid`
    pub fn new(jid: impl Into<String>, sid: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            sid: sid.into(),
        }
    }

    /// The jid of the session being re-attached
    pub fn jid(&self) -> &str {
        &self.jid
    }

    /// The stream id of the session being re-attached
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Encode as a top-level stream element
    pub fn to_xml(&self) -> Result<Bytes, WireError> {
        let mut writer = Writer::new(Vec::new());

        let mut rebind = BytesStart::new(FEATURE_ELEMENT);
        rebind.push_attribute(("xmlns", REBIND_NAMESPACE));
        writer
            .write_event(Event::Start(rebind))
            .map_err(WireError::encode)?;

        write_text_element(&mut writer, "jid", &self.jid)?;
        write_text_element(&mut writer, "sid", &self.sid)?;

        writer
            .write_event(Event::End(BytesEnd::new(FEATURE_ELEMENT)))
            .map_err(WireError::encode)?;

        Ok(Bytes::from(writer.into_inner()))
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), WireError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(WireError::encode)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(WireError::encode)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(WireError::encode)?;
    Ok(())
}
