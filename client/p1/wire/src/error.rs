//! Wire encoding error types.

use thiserror::Error;

/// Wire encoding errors
#[derive(Error, Debug)]
pub enum WireError {
    /// XML writer failure
    #[error("xml encode failed: {0}")]
    Encode(String),

    /// Element produced without a required field
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

impl WireError {
    pub(crate) fn encode<E: std::fmt::Display>(e: E) -> Self {
        WireError::Encode(e.to_string())
    }
}
