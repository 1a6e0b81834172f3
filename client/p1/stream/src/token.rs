//! Stream tokens and the token source trait.

use crate::error::StreamError;
use async_trait::async_trait;

/// One token produced by the inbound stream reader.
///
/// Depth counts open elements, with the stream root at depth 1; direct
/// children of the root (stanzas and out-of-band replies) are at depth 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlToken {
    /// Start of an element (empty elements produce a start/end pair)
    ElementStart {
        /// Local element name
        name: String,
        /// Resolved namespace, when one is in scope
        namespace: Option<String>,
        /// Attributes, excluding namespace declarations
        attributes: Vec<(String, String)>,
        /// Depth of this element
        depth: usize,
    },
    /// End of an element
    ElementEnd {
        /// Local element name
        name: String,
        /// Depth of the closing element
        depth: usize,
    },
    /// Character data (whitespace-only runs are suppressed by the reader)
    Text {
        /// Unescaped character data
        value: String,
        /// Depth of the enclosing element
        depth: usize,
    },
    /// End of the stream
    Eof,
}

/// Source of inbound stream tokens.
///
/// The connection layer depends on this seam rather than on a concrete
/// parser, so interception can be layered in as a transparent decorator.
#[async_trait]
pub trait TokenRead: Send {
    /// Produce the next token, waiting for more input if needed
    async fn next_token(&mut self) -> Result<XmlToken, StreamError>;
}
