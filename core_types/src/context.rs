//! Addressing contexts
//!
//! A context names an addressing namespace ("local files", "public URLs").
//! Contexts are never declared; they exist because roots and join points
//! are registered under them. The empty string is the default context.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of an addressing namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(String);

impl Context {
    /// Creates a context from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the default (empty) context
    pub fn default_context() -> Self {
        Self(String::new())
    }

    /// Returns the context name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the default context
    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for Context {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Context {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Context {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Context {
    fn borrow(&self) -> &str {
        &self.0
    }
}
