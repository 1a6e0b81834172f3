//! Async XML token reader with namespace and depth tracking.

use crate::error::StreamError;
use crate::token::{TokenRead, XmlToken};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use tokio::io::AsyncBufRead;

/// Namespace declarations introduced by one open element
#[derive(Debug, Default)]
struct NsScope {
    default_ns: Option<String>,
    prefixes: HashMap<String, String>,
}

/// Token reader over an async byte stream.
///
/// Tracks element depth and in-scope namespace declarations so consumers can
/// classify elements by qualified name without re-parsing. Whitespace-only
/// character data (the peer's own keepalive traffic) is suppressed; empty
/// elements are split into a start/end token pair.
pub struct XmlTokenReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    scopes: Vec<NsScope>,
    pending_end: Option<String>,
}

impl<R: AsyncBufRead + Unpin + Send> XmlTokenReader<R> {
    /// Wrap an async reader positioned at the start of the stream
    pub fn new(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::with_capacity(4 * 1024),
            scopes: Vec::new(),
            pending_end: None,
        }
    }

    fn open_scope(&self, start: &BytesStart<'_>) -> Result<NsScope, StreamError> {
        let mut scope = NsScope::default();
        for attr in start.attributes() {
            let attr = attr.map_err(StreamError::malformed)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(StreamError::malformed)?
                .into_owned();

            if key == "xmlns" {
                scope.default_ns = Some(value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.prefixes.insert(prefix.to_string(), value);
            }
        }
        Ok(scope)
    }

    fn attributes_of(&self, start: &BytesStart<'_>) -> Result<Vec<(String, String)>, StreamError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(StreamError::malformed)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr
                .unescape_value()
                .map_err(StreamError::malformed)?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(attributes)
    }

    /// Resolve the namespace of a possibly prefixed name against open scopes
    fn resolve_namespace(&self, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some(prefix) => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.prefixes.get(prefix))
                .cloned(),
            None => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.default_ns.clone()),
        }
    }

    fn element_start(&mut self, start: &BytesStart<'_>) -> Result<XmlToken, StreamError> {
        let raw_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, local) = split_qname(&raw_name);
        let attributes = self.attributes_of(start)?;
        let scope = self.open_scope(start)?;
        self.scopes.push(scope);

        Ok(XmlToken::ElementStart {
            namespace: self.resolve_namespace(prefix),
            name: local.to_string(),
            attributes,
            depth: self.scopes.len(),
        })
    }

    fn element_end(&mut self, local: &str) -> XmlToken {
        let depth = self.scopes.len();
        self.scopes.pop();
        XmlToken::ElementEnd {
            name: local.to_string(),
            depth,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> TokenRead for XmlTokenReader<R> {
    async fn next_token(&mut self) -> Result<XmlToken, StreamError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(self.element_end(&name));
        }

        loop {
            self.buf.clear();
            match self.reader.read_event_into_async(&mut self.buf).await? {
                Event::Start(start) => {
                    let start = start.into_owned();
                    return self.element_start(&start);
                }
                Event::Empty(start) => {
                    let start = start.into_owned();
                    let token = self.element_start(&start)?;
                    if let XmlToken::ElementStart { name, .. } = &token {
                        self.pending_end = Some(name.clone());
                    }
                    return Ok(token);
                }
                Event::End(end) => {
                    let raw_name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let (_, local) = split_qname(&raw_name);
                    return Ok(self.element_end(local));
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(StreamError::malformed)?;
                    if value.trim().is_empty() {
                        continue;
                    }
                    return Ok(XmlToken::Text {
                        value: value.into_owned(),
                        depth: self.scopes.len(),
                    });
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    return Ok(XmlToken::Text {
                        value,
                        depth: self.scopes.len(),
                    });
                }
                Event::Eof => return Ok(XmlToken::Eof),
                // Declarations, comments, processing instructions
                _ => continue,
            }
        }
    }
}

fn split_qname(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    }
}
