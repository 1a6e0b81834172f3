//! Inline interception of out-of-band rebind replies.

use crate::error::StreamError;
use crate::rendezvous::ResumeRendezvous;
use crate::token::{TokenRead, XmlToken};
use async_trait::async_trait;
use p1_wire::{RebindOutcome, ReplyKind, ReplyRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

/// Transparent [`TokenRead`] decorator that routes rebind replies to the
/// login context.
///
/// Every token from the wrapped reader passes through unchanged, except
/// element starts at stream-child depth whose qualified name is registered:
/// those elements are consumed in full, their outcome is delivered to the
/// rendezvous, and token production continues with the following token, so
/// the reply never reaches ordinary stanza dispatch.
pub struct RebindInterceptor<R> {
    inner: R,
    registry: Arc<ReplyRegistry>,
    rendezvous: Arc<ResumeRendezvous>,
}

/// Depth at which out-of-band replies appear: direct children of the stream root
const REPLY_DEPTH: usize = 2;

impl<R: TokenRead> RebindInterceptor<R> {
    /// Decorate a token reader
    pub fn new(inner: R, registry: Arc<ReplyRegistry>, rendezvous: Arc<ResumeRendezvous>) -> Self {
        Self {
            inner,
            registry,
            rendezvous,
        }
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Consume a success acknowledgment through its end tag.
    ///
    /// A well-formed acknowledgment is empty; any embedded content resolves
    /// the attempt as not resumed instead of faulting the stream, since a
    /// stalled resumption is worse than falling back to normal login.
    async fn consume_success(&mut self) -> Result<(), StreamError> {
        let mut nested = 0usize;
        let mut well_formed = true;

        loop {
            match self.inner.next_token().await? {
                XmlToken::ElementEnd { .. } if nested == 0 => break,
                XmlToken::ElementEnd { .. } => nested -= 1,
                XmlToken::ElementStart { .. } => {
                    nested += 1;
                    well_formed = false;
                }
                XmlToken::Text { .. } => well_formed = false,
                XmlToken::Eof => return Err(StreamError::UnexpectedEof),
            }
        }

        if well_formed {
            debug!("rebind acknowledged by server");
            self.rendezvous.deliver(RebindOutcome::Resumed);
        } else {
            warn!("malformed rebind acknowledgment, treating as not resumed");
            self.rendezvous
                .deliver(RebindOutcome::NotResumed { reason: None });
        }
        Ok(())
    }

    /// Consume a failure reply, concatenating embedded character data as the
    /// reason. Delivery is dropped by the rendezvous when no request is
    /// outstanding, which guards against spurious failure replies.
    async fn consume_failure(&mut self) -> Result<(), StreamError> {
        let mut nested = 0usize;
        let mut message = String::new();

        loop {
            match self.inner.next_token().await? {
                XmlToken::ElementEnd { .. } if nested == 0 => break,
                XmlToken::ElementEnd { .. } => nested -= 1,
                XmlToken::ElementStart { .. } => nested += 1,
                XmlToken::Text { value, .. } => message.push_str(&value),
                XmlToken::Eof => return Err(StreamError::UnexpectedEof),
            }
        }

        let reason = if message.is_empty() {
            None
        } else {
            Some(message)
        };
        debug!(?reason, "rebind failed");
        self.rendezvous
            .deliver(RebindOutcome::NotResumed { reason });
        Ok(())
    }
}

#[async_trait]
impl<R: TokenRead> TokenRead for RebindInterceptor<R> {
    async fn next_token(&mut self) -> Result<XmlToken, StreamError> {
        loop {
            let token = self.inner.next_token().await?;

            if let XmlToken::ElementStart {
                name,
                namespace,
                depth: REPLY_DEPTH,
                ..
            } = &token
            {
                let namespace = namespace.as_deref().unwrap_or("");
                match self.registry.lookup(name, namespace) {
                    Some(ReplyKind::RebindSuccess) => {
                        self.consume_success().await?;
                        continue;
                    }
                    Some(ReplyKind::RebindFailure) => {
                        self.consume_failure().await?;
                        continue;
                    }
                    None => {}
                }
            }

            return Ok(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::XmlTokenReader;
    use std::collections::VecDeque;

    struct ScriptedReader {
        tokens: VecDeque<XmlToken>,
    }

    impl ScriptedReader {
        fn new(tokens: Vec<XmlToken>) -> Self {
            Self {
                tokens: tokens.into(),
            }
        }
    }

    #[async_trait]
    impl TokenRead for ScriptedReader {
        async fn next_token(&mut self) -> Result<XmlToken, StreamError> {
            Ok(self.tokens.pop_front().unwrap_or(XmlToken::Eof))
        }
    }

    fn start(name: &str, namespace: &str, depth: usize) -> XmlToken {
        XmlToken::ElementStart {
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            attributes: vec![],
            depth,
        }
    }

    fn end(name: &str, depth: usize) -> XmlToken {
        XmlToken::ElementEnd {
            name: name.to_string(),
            depth,
        }
    }

    fn intercepting(
        tokens: Vec<XmlToken>,
    ) -> (RebindInterceptor<ScriptedReader>, Arc<ResumeRendezvous>) {
        let rendezvous = Arc::new(ResumeRendezvous::new());
        let interceptor = RebindInterceptor::new(
            ScriptedReader::new(tokens),
            Arc::new(ReplyRegistry::with_builtin()),
            Arc::clone(&rendezvous),
        );
        (interceptor, rendezvous)
    }

    #[tokio::test]
    async fn test_success_is_suppressed_and_delivered() {
        let (mut interceptor, rendezvous) = intercepting(vec![
            start("rebind", "p1:rebind", 2),
            end("rebind", 2),
            start("message", "jabber:client", 2),
            end("message", 2),
        ]);
        let rx = rendezvous.arm();

        let next = interceptor.next_token().await.unwrap();
        assert_eq!(next, start("message", "jabber:client", 2));
        assert_eq!(rx.await.unwrap(), RebindOutcome::Resumed);
    }

    #[tokio::test]
    async fn test_failure_reason_is_concatenated() {
        let (mut interceptor, rendezvous) = intercepting(vec![
            start("failure", "p1:rebind", 2),
            XmlToken::Text {
                value: "inv".to_string(),
                depth: 2,
            },
            XmlToken::Text {
                value: "alid".to_string(),
                depth: 2,
            },
            end("failure", 2),
        ]);
        let rx = rendezvous.arm();

        assert_eq!(interceptor.next_token().await.unwrap(), XmlToken::Eof);
        assert_eq!(
            rx.await.unwrap(),
            RebindOutcome::NotResumed {
                reason: Some("invalid".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_spurious_failure_without_request_is_ignored() {
        let (mut interceptor, rendezvous) = intercepting(vec![
            start("failure", "p1:rebind", 2),
            end("failure", 2),
            start("presence", "jabber:client", 2),
            end("presence", 2),
        ]);

        // No armed request; the stream keeps flowing.
        let next = interceptor.next_token().await.unwrap();
        assert_eq!(next, start("presence", "jabber:client", 2));
        assert!(!rendezvous.is_armed());
    }

    #[tokio::test]
    async fn test_malformed_success_degrades_to_not_resumed() {
        let (mut interceptor, rendezvous) = intercepting(vec![
            start("rebind", "p1:rebind", 2),
            XmlToken::Text {
                value: "unexpected".to_string(),
                depth: 2,
            },
            end("rebind", 2),
        ]);
        let rx = rendezvous.arm();

        assert_eq!(interceptor.next_token().await.unwrap(), XmlToken::Eof);
        assert_eq!(
            rx.await.unwrap(),
            RebindOutcome::NotResumed { reason: None }
        );
    }

    #[tokio::test]
    async fn test_nested_elements_are_not_intercepted() {
        let (mut interceptor, rendezvous) = intercepting(vec![
            start("message", "jabber:client", 2),
            start("rebind", "p1:rebind", 3),
            end("rebind", 3),
            end("message", 2),
        ]);
        let _rx = rendezvous.arm();

        assert_eq!(
            interceptor.next_token().await.unwrap(),
            start("message", "jabber:client", 2)
        );
        assert_eq!(
            interceptor.next_token().await.unwrap(),
            start("rebind", "p1:rebind", 3)
        );
        assert!(rendezvous.is_armed());
    }

    #[tokio::test]
    async fn test_interception_over_real_reader() {
        let xml: &[u8] = b"<stream:stream xmlns=\"jabber:client\" \
            xmlns:stream=\"http://etherx.jabber.org/streams\">\
            <rebind xmlns=\"p1:rebind\"/>\
            <message><body>hello</body></message>";
        let rendezvous = Arc::new(ResumeRendezvous::new());
        let mut interceptor = RebindInterceptor::new(
            XmlTokenReader::new(xml),
            Arc::new(ReplyRegistry::with_builtin()),
            Arc::clone(&rendezvous),
        );
        let rx = rendezvous.arm();

        // Stream root passes through, then the acknowledgment is swallowed
        // and the message is the next visible stream child.
        let root = interceptor.next_token().await.unwrap();
        assert!(matches!(root, XmlToken::ElementStart { depth: 1, .. }));

        let next = interceptor.next_token().await.unwrap();
        assert!(
            matches!(&next, XmlToken::ElementStart { name, depth: 2, .. } if name == "message")
        );
        assert_eq!(rx.await.unwrap(), RebindOutcome::Resumed);
    }
}
