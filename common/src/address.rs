use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Separator between the local part and the chain id in the string form
pub const QUALIFIER_SEPARATOR: char = '@';

/// An account or contract reference: a local address paired with the id of
/// the chain it lives on.
///
/// An address is only usable as a caller reference once it is fully
/// qualified (both parts non-empty). A half-populated address must never be
/// sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    local: String,
    chain_id: String,
}

impl Address {
    pub fn new<L: Into<String>, C: Into<String>>(local: L, chain_id: C) -> Self {
        Self {
            local: local.into(),
            chain_id: chain_id.into(),
        }
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    // Both parts must be set before the address can be used as a caller
    pub fn is_fully_qualified(&self) -> bool {
        !self.local.is_empty() && !self.chain_id.is_empty()
    }

    /// String form sent on the wire: `local@chain_id`
    pub fn fully_qualified(&self) -> String {
        format!("{}{}{}", self.local, QUALIFIER_SEPARATOR, self.chain_id)
    }

    /// Parse a `local@chain_id` or bare local string, qualifying a bare
    /// local part with the given chain id.
    pub fn parse(value: &str, default_chain_id: &str) -> Self {
        match value.split_once(QUALIFIER_SEPARATOR) {
            Some((local, chain_id)) => Self::new(local, chain_id),
            None => Self::new(value, default_chain_id),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chain_id.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}{}{}", self.local, QUALIFIER_SEPARATOR, self.chain_id)
        }
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::parse(value, "")
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}
