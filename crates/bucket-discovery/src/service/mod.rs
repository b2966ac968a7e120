//! # Bucket Registry Service
//!
//! Implements the [`DiscoveryBackend`](crate::ports::DiscoveryBackend) port
//! on top of an [`ObjectStore`](crate::ports::ObjectStore) and a
//! [`RecordCodec`](crate::ports::RecordCodec).
//!
//! The registry keeps no membership state between calls. Every operation is a
//! sequential series of awaited store calls; failures are logged, counted and
//! absorbed.

mod api;
mod core;
mod read;
mod remove;
mod write;

pub use core::BucketRegistry;
pub use read::ReadReport;
