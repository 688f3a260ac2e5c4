//! Opaque principal identifiers.
//!
//! Principals are compared by value only. How a principal is authenticated
//! is outside this crate; callers hand in whatever identity the hosting
//! environment already verified.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier that can never hold a membership, receive one, or act as an
/// authority. Transfers to it burn value, so every ledger rejects it.
pub const RESERVED_NULL_PRINCIPAL: &str = "SP000000000000000000002Q6VF78";

/// An opaque, comparable caller/owner identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The reserved null identifier.
    #[must_use]
    pub fn reserved_null() -> Self {
        Self(RESERVED_NULL_PRINCIPAL.to_owned())
    }

    #[must_use]
    pub fn is_reserved_null(&self) -> bool {
        self.0 == RESERVED_NULL_PRINCIPAL
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
