//! # Domain Layer
//!
//! Pure discovery-registry types: identities, records, key naming,
//! configuration, the response accumulator and the side discovery cache.
//!
//! Nothing in here performs I/O.

pub mod cache;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod responses;
pub mod value_objects;

pub use cache::{CachedPeer, DiscoveryCache};
pub use entities::{NodeAddress, PeerRecord};
pub use errors::{CodecError, KeyError, RegistryError, StoreError};
pub use keys::{filename_for, group_prefix, object_key, GroupName, KeyPrefix, OBJECT_SUFFIX};
pub use responses::{Response, Responses};
pub use value_objects::{ListingMode, RegistryConfig, WriteOptions};
