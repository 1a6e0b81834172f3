//! Registry of out-of-band stream replies.
//!
//! The inbound stream interceptor classifies top-level elements through a
//! registry constructed once at connection setup, rather than through
//! process-wide registration. Only the rebind replies are registered by
//! default; additional qualified names can be mapped to an existing kind.

use crate::rebind::{FAILURE_ELEMENT, FEATURE_ELEMENT, REBIND_NAMESPACE};
use std::collections::HashMap;

/// Classification of an intercepted top-level element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Empty acknowledgment of a rebind request
    RebindSuccess,
    /// Rebind failure carrying an optional reason
    RebindFailure,
}

/// Maps qualified element names to the reply they represent
#[derive(Debug, Clone)]
pub struct ReplyRegistry {
    entries: HashMap<(String, String), ReplyKind>,
}

impl ReplyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry with the rebind replies registered
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(FEATURE_ELEMENT, REBIND_NAMESPACE, ReplyKind::RebindSuccess);
        registry.register(FAILURE_ELEMENT, REBIND_NAMESPACE, ReplyKind::RebindFailure);
        registry
    }

    /// Map a qualified name to a reply kind
    pub fn register(&mut self, name: &str, namespace: &str, kind: ReplyKind) {
        self.entries
            .insert((name.to_string(), namespace.to_string()), kind);
    }

    /// Look up the reply kind for a qualified name, if registered
    pub fn lookup(&self, name: &str, namespace: &str) -> Option<ReplyKind> {
        self.entries
            .get(&(name.to_string(), namespace.to_string()))
            .copied()
    }
}

impl Default for ReplyRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
