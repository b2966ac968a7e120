//! Core Domain Entities for Bucket Discovery
//!
//! A node advertises itself as a [`PeerRecord`]; every other node that lists
//! the group prefix reads it back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::KeyError;

/// Opaque, comparable identity of a group member.
///
/// Backed by a UUID so that two nodes never derive the same storage key.
/// The hyphenated text form is what ends up in object keys and payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddress(Uuid);

impl NodeAddress {
    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random address (v4 UUID).
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NodeAddress {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| KeyError::InvalidAddress(s.to_string()))
    }
}

impl From<Uuid> for NodeAddress {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// One node's discovery advertisement.
///
/// Produced by a node about itself, consumed by every node that reads the
/// group. Superseded by overwriting the same object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Identity of the advertising node.
    pub address: NodeAddress,
    /// Human readable node name (display only).
    pub logical_name: String,
    /// Transport endpoint, e.g. `10.0.0.5:7800`.
    pub physical_addr: String,
    /// "I believe I am the group coordinator."
    pub is_coordinator: bool,
}

impl PeerRecord {
    /// Create a plain member record.
    pub fn new(
        address: NodeAddress,
        logical_name: impl Into<String>,
        physical_addr: impl Into<String>,
    ) -> Self {
        Self {
            address,
            logical_name: logical_name.into(),
            physical_addr: physical_addr.into(),
            is_coordinator: false,
        }
    }

    /// Builder-style setter for the coordinator flag.
    #[must_use]
    pub fn with_coordinator(mut self, is_coordinator: bool) -> Self {
        self.is_coordinator = is_coordinator;
        self
    }
}

impl fmt::Display for PeerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) @ {}{}",
            self.logical_name,
            self.address,
            self.physical_addr,
            if self.is_coordinator { " [coord]" } else { "" }
        )
    }
}
