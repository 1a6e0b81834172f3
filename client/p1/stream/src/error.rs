//! Stream reading error types.

use thiserror::Error;

/// Stream reading errors
#[derive(Error, Debug)]
pub enum StreamError {
    /// XML parse failure from the underlying reader
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute or escape sequence
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The stream ended inside an element
    #[error("unexpected end of stream")]
    UnexpectedEof,
}

impl StreamError {
    pub(crate) fn malformed<E: std::fmt::Display>(e: E) -> Self {
        StreamError::Malformed(e.to_string())
    }
}
