//! # Adapters Layer
//!
//! Concrete implementations of the driven ports:
//!
//! - [`memory`]: in-process object store (tests, single-process demos)
//! - [`file`]: directory-backed object store (shared volumes)
//! - `s3`: S3-compatible HTTP object store (feature `s3`)
//! - [`codec`]: text and JSON record codecs

pub mod codec;
pub mod file;
pub mod memory;

#[cfg(feature = "s3")]
pub mod s3;

pub use codec::{CodecKind, JsonRecordCodec, TextRecordCodec};
pub use file::FileObjectStore;
pub use memory::{InMemoryObjectStore, StoredObject};

#[cfg(feature = "s3")]
pub use s3::{Credentials, S3Config, S3ObjectStore};
