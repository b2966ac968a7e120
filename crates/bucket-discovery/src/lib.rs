//! # Bucket Discovery
//!
//! Group-membership discovery through a shared object store.
//!
//! Every node of a group periodically writes its own advertisement to
//! `<prefix><group>/<address>.list` and discovers its peers by listing the
//! group prefix and reading every object under it. The store (an S3 bucket,
//! a shared directory, or memory) is only a rendezvous point: there is no
//! locking, no compare-and-swap, and consistency is whatever the backend
//! offers.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** identities, records, key naming, config, response sink
//!   and discovery cache
//! - **Ports Layer:** [`DiscoveryBackend`] upward; [`ObjectStore`],
//!   [`RecordCodec`] and [`DiscoveryMetrics`] downward
//! - **Service Layer:** [`BucketRegistry`], the best-effort
//!   read/write/remove/remove-all protocol
//! - **Adapters Layer:** memory, file and S3 (feature `s3`) stores; text and
//!   JSON codecs
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bucket_discovery::{
//!     BucketRegistry, DiscoveryBackend, InMemoryObjectStore, NodeAddress, PeerRecord,
//!     RegistryConfig, Responses, TextRecordCodec,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryObjectStore::new());
//! let me = NodeAddress::random();
//! let registry = BucketRegistry::new(
//!     store,
//!     Arc::new(TextRecordCodec),
//!     RegistryConfig::with_prefix("jgroups"),
//!     me,
//! );
//!
//! registry
//!     .write(&[PeerRecord::new(me, "node-a", "10.0.0.1:7800")], "g1")
//!     .await;
//!
//! let mut responses = Responses::new();
//! registry.read_all(None, "g1", &mut responses).await;
//! assert!(responses.contains(&me));
//! # }
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

/// Object stores and record codecs.
/// The S3 store requires feature: `s3`
pub mod adapters;

/// Test utilities (FaultInjectingStore, RecordingMetrics, fixtures)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Domain
pub use domain::{
    filename_for, group_prefix, object_key, CachedPeer, CodecError, DiscoveryCache, GroupName,
    KeyError, KeyPrefix, ListingMode, NodeAddress, PeerRecord, RegistryConfig, RegistryError,
    Response, Responses, StoreError, WriteOptions, OBJECT_SUFFIX,
};

// Port traits
pub use ports::{
    DiscoveryBackend, DiscoveryMetrics, ListPage, NoOpMetrics, ObjectStore, ObjectSummary,
    OpOutcome, PutOptions, RecordCodec, RegistryOp, ResponseSink,
};

// Service
pub use service::{BucketRegistry, ReadReport};

// Adapters
pub use adapters::{
    CodecKind, FileObjectStore, InMemoryObjectStore, JsonRecordCodec, StoredObject,
    TextRecordCodec,
};

#[cfg(feature = "s3")]
pub use adapters::{Credentials, S3Config, S3ObjectStore};
