//! # Key Naming
//!
//! Pure functions mapping (namespace prefix, group name, node address) to
//! object-store keys.
//!
//! ```text
//! <prefix>/<group>/<uuid>.list
//! └──────┘ normalized KeyPrefix ("" or ending in exactly one '/')
//!          └──────┘ GroupName, not escaped
//!                   └─────────┘ filename_for(address)
//! ```
//!
//! The group name is used verbatim. Callers must not pick group names whose
//! embedded `/` would make one group's prefix a prefix of another's listing
//! (`g1` vs `g1/sub`). This is not enforced.

use std::fmt;

use super::entities::NodeAddress;
use super::errors::KeyError;

/// Suffix appended to every per-node object.
pub const OBJECT_SUFFIX: &str = ".list";

/// Normalized namespace prefix placed in front of every group.
///
/// Empty, or guaranteed to end with exactly one trailing `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    /// Normalize a configured prefix.
    ///
    /// `None`, `""` and `"/"` all become the empty prefix. Anything else has
    /// its trailing slashes collapsed into exactly one.
    pub fn normalize(raw: Option<&str>) -> Self {
        let trimmed = raw.unwrap_or_default().trim_end_matches('/');
        if trimmed.is_empty() {
            Self(String::new())
        } else {
            Self(format!("{}/", trimmed))
        }
    }

    /// The empty prefix.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for KeyPrefix {
    fn from(raw: &str) -> Self {
        Self::normalize(Some(raw))
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical identifier of a set of cooperating nodes.
///
/// Construction rejects blank names: a blank name is what the upward
/// interface treats as "absent". Anything else is kept byte for byte, so
/// `" g1"` and `"g1"` are different groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupName(String);

impl GroupName {
    /// Validate a group name.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.trim().is_empty() {
            return Err(KeyError::EmptyGroup);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage-key-safe file name for a node.
///
/// Injective: the hyphenated UUID contains only `[0-9a-f-]`, so distinct
/// addresses never collide and the suffix cannot be confused with the id.
pub fn filename_for(address: &NodeAddress) -> String {
    format!("{}{}", address, OBJECT_SUFFIX)
}

/// `prefix + group + "/"`. Listing root for read-all and remove-all.
pub fn group_prefix(prefix: &KeyPrefix, group: &GroupName) -> String {
    format!("{}{}/", prefix.as_str(), group.as_str())
}

/// `group_prefix + filename_for(address)`. The unit of storage mutation.
pub fn object_key(prefix: &KeyPrefix, group: &GroupName, address: &NodeAddress) -> String {
    format!("{}{}", group_prefix(prefix, group), filename_for(address))
}
