//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the registry requires from its host: an object store, a
//! record codec and (optionally) a metrics sink.

use async_trait::async_trait;

use crate::domain::{CodecError, PeerRecord, RegistryError, StoreError};

/// One entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key.
    pub key: String,
    /// Content length in bytes as reported by the listing.
    pub size: u64,
}

impl ObjectSummary {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page; `None` when the listing is complete.
    pub next_continuation: Option<String>,
}

impl ListPage {
    /// Final page with the given objects.
    pub fn last(objects: Vec<ObjectSummary>) -> Self {
        Self {
            objects,
            next_continuation: None,
        }
    }
}

/// Metadata attached to a put.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type of the body.
    pub content_type: String,
    /// Grant the bucket owner full control of the object.
    pub grant_bucket_owner_full_control: bool,
    /// Encrypt server-side with this KMS key.
    pub kms_key_id: Option<String>,
}

/// Minimal storage capability: list-by-prefix, get, put, delete.
///
/// No atomicity, ordering or uniqueness guarantees are expected beyond what
/// the backing store offers. Timeouts belong to the implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of keys under `prefix`, continuing from `continuation`.
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Fetch the full body of `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or overwrite `key`.
    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Stable, versioned record serialization.
pub trait RecordCodec: Send + Sync {
    /// Serialize all records into one payload.
    fn encode(&self, records: &[PeerRecord]) -> Result<Vec<u8>, CodecError>;

    /// Parse a payload into zero or more records.
    fn decode(&self, payload: &[u8]) -> Result<Vec<PeerRecord>, CodecError>;

    /// Content type stored alongside every payload.
    fn content_type(&self) -> &'static str;
}

/// Registry operation, for metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryOp {
    ReadAll,
    Write,
    Remove,
    RemoveAll,
}

impl RegistryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryOp::ReadAll => "read_all",
            RegistryOp::Write => "write",
            RegistryOp::Remove => "remove",
            RegistryOp::RemoveAll => "remove_all",
        }
    }
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpOutcome {
    Success,
    /// Completed, but some objects were skipped or failed.
    Partial,
    Failure,
}

impl OpOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpOutcome::Success => "success",
            OpOutcome::Partial => "partial",
            OpOutcome::Failure => "failure",
        }
    }
}

/// Metrics sink for registry operations.
pub trait DiscoveryMetrics: Send + Sync {
    /// An operation finished with `outcome`.
    fn record_operation(&self, op: RegistryOp, outcome: OpOutcome);

    /// A single error was absorbed during `op`.
    fn record_error(&self, op: RegistryOp, error: &RegistryError);

    /// A read round delivered `delivered` records to the sink and registered
    /// `cached` possible peers.
    fn record_read_round(&self, delivered: usize, cached: usize);
}

/// Metrics sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl DiscoveryMetrics for NoOpMetrics {
    fn record_operation(&self, _op: RegistryOp, _outcome: OpOutcome) {}
    fn record_error(&self, _op: RegistryOp, _error: &RegistryError) {}
    fn record_read_round(&self, _delivered: usize, _cached: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_labels() {
        assert_eq!(RegistryOp::RemoveAll.as_str(), "remove_all");
        assert_eq!(OpOutcome::Partial.as_str(), "partial");
    }
}
