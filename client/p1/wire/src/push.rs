//! The `p1:push` enable/disable payloads.
//!
//! Push enablement is negotiated over the connection's correlated
//! request/response primitive; this module only renders the request child
//! element. The device-scoped children (`body`, `status`, `offline`,
//! `notification`, `appid`) are emitted only when a device id is configured,
//! matching the protocol as deployed.

use crate::error::WireError;
use bytes::Bytes;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Namespace of the push protocol
pub const PUSH_NAMESPACE: &str = "p1:push";

/// When the server should generate a push notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPolicy {
    /// Push for every message
    All,
    /// Push for the first message from each sender
    FirstPerUser,
    /// Push for the first message only
    First,
    /// Never push
    None,
}

impl SendPolicy {
    /// Wire value of this policy
    pub fn as_str(self) -> &'static str {
        match self {
            SendPolicy::All => "all",
            SendPolicy::FirstPerUser => "firstPerUser",
            SendPolicy::First => "first",
            SendPolicy::None => "none",
        }
    }
}

/// How the author is named in generated notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromPolicy {
    /// Full jid address
    Jid,
    /// Local part of the jid
    Username,
    /// Roster name
    Name,
    /// Omit the author entirely
    None,
}

impl FromPolicy {
    /// Wire value of this policy
    pub fn as_str(self) -> &'static str {
        match self {
            FromPolicy::Jid => "jid",
            FromPolicy::Username => "username",
            FromPolicy::Name => "name",
            FromPolicy::None => "none",
        }
    }
}

/// Immutable description of a push enablement request.
///
/// `keepalive` is the server-side inactivity window in seconds before the
/// session switches to out-of-reception mode; `session` is how long, in
/// minutes, the server keeps the session alive without any connection.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Use the sandbox push gateway instead of production
    pub sandbox: bool,
    /// Inactivity window in seconds before out-of-reception mode
    pub keepalive: u32,
    /// Detached session lifetime in minutes
    pub session: u32,
    /// When notifications are generated
    pub send: SendPolicy,
    /// Whether group chat messages generate notifications
    pub groupchat: bool,
    /// How the author is rendered in notifications
    pub from: FromPolicy,
    /// Presence type set while out of reception
    pub status_type: Option<String>,
    /// Presence message set while out of reception
    pub status_message: Option<String>,
    /// Whether offline delivery is enabled
    pub offline: bool,
    /// Device type, e.g. "gcm"
    pub device_type: Option<String>,
    /// Push token from the platform push service
    pub device_id: Option<String>,
    /// Application id as registered on the server
    pub app_id: Option<String>,
}

impl PushConfig {
    /// Create a minimal configuration with no device block
    pub fn new(keepalive: u32, session: u32) -> Self {
        Self {
            sandbox: false,
            keepalive,
            session,
            send: SendPolicy::All,
            groupchat: false,
            from: FromPolicy::None,
            status_type: None,
            status_message: None,
            offline: false,
            device_type: None,
            device_id: None,
            app_id: None,
        }
    }

    /// Encode the enable request payload
    pub fn to_xml(&self) -> Result<Bytes, WireError> {
        let mut writer = Writer::new(Vec::new());

        let mut push = BytesStart::new("push");
        push.push_attribute(("xmlns", PUSH_NAMESPACE));
        push.push_attribute(("apns-sandbox", bool_str(self.sandbox)));
        writer
            .write_event(Event::Start(push))
            .map_err(WireError::encode)?;

        let mut keepalive = BytesStart::new("keepalive");
        keepalive.push_attribute(("max", self.keepalive.to_string().as_str()));
        writer
            .write_event(Event::Empty(keepalive))
            .map_err(WireError::encode)?;

        let mut session = BytesStart::new("session");
        session.push_attribute(("duration", self.session.to_string().as_str()));
        writer
            .write_event(Event::Empty(session))
            .map_err(WireError::encode)?;

        if let Some(device_id) = &self.device_id {
            let device_type = self
                .device_type
                .as_deref()
                .ok_or(WireError::MissingField("device_type"))?;
            let app_id = self
                .app_id
                .as_deref()
                .ok_or(WireError::MissingField("app_id"))?;

            let mut body = BytesStart::new("body");
            body.push_attribute(("send", self.send.as_str()));
            body.push_attribute(("groupchat", bool_str(self.groupchat)));
            body.push_attribute(("from", self.from.as_str()));
            writer
                .write_event(Event::Empty(body))
                .map_err(WireError::encode)?;

            if let Some(status_type) = &self.status_type {
                let mut status = BytesStart::new("status");
                status.push_attribute(("type", status_type.as_str()));
                writer
                    .write_event(Event::Start(status))
                    .map_err(WireError::encode)?;
                if let Some(message) = &self.status_message {
                    writer
                        .write_event(Event::Text(BytesText::new(message)))
                        .map_err(WireError::encode)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new("status")))
                    .map_err(WireError::encode)?;
            }

            write_text_element(&mut writer, "offline", bool_str(self.offline))?;

            writer
                .write_event(Event::Start(BytesStart::new("notification")))
                .map_err(WireError::encode)?;
            write_text_element(&mut writer, "type", device_type)?;
            write_text_element(&mut writer, "id", device_id)?;
            writer
                .write_event(Event::End(BytesEnd::new("notification")))
                .map_err(WireError::encode)?;

            write_text_element(&mut writer, "appid", app_id)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("push")))
            .map_err(WireError::encode)?;

        Ok(Bytes::from(writer.into_inner()))
    }
}

/// Encode the disable request payload
pub fn disable_xml() -> Bytes {
    Bytes::from_static(br#"<disable xmlns="p1:push"/>"#)
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
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
