//! Test utilities for the discovery registry.
//!
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use bucket_discovery::test_utils::FaultInjectingStore;
//!
//! let store = FaultInjectingStore::new();
//! store.fail_delete("g1/broken.list");
//! assert_eq!(store.delete_calls(), 0);
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::adapters::{InMemoryObjectStore, TextRecordCodec};
use crate::domain::{NodeAddress, PeerRecord, RegistryConfig, RegistryError, StoreError};
use crate::ports::{
    DiscoveryMetrics, ListPage, ObjectStore, OpOutcome, PutOptions, RegistryOp,
};
use crate::service::BucketRegistry;

#[derive(Debug, Default)]
struct Faults {
    get_keys: HashSet<String>,
    delete_keys: HashSet<String>,
    /// Fail every listing call after this many have succeeded.
    list_after: Option<usize>,
    put: bool,
}

#[derive(Debug, Default)]
struct Calls {
    list: usize,
    get: Vec<String>,
    put: Vec<String>,
    delete: Vec<String>,
}

/// [`InMemoryObjectStore`] wrapper with per-key fault injection and call
/// recording.
#[derive(Debug, Default)]
pub struct FaultInjectingStore {
    inner: InMemoryObjectStore,
    faults: Mutex<Faults>,
    calls: Mutex<Calls>,
}

impl FaultInjectingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a store that paginates after `page_size` entries.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: InMemoryObjectStore::with_page_size(page_size),
            ..Self::default()
        }
    }

    /// Underlying store, for seeding and inspection without recording calls.
    pub fn inner(&self) -> &InMemoryObjectStore {
        &self.inner
    }

    pub fn fail_get(&self, key: impl Into<String>) {
        self.faults.lock().get_keys.insert(key.into());
    }

    pub fn fail_delete(&self, key: impl Into<String>) {
        self.faults.lock().delete_keys.insert(key.into());
    }

    /// Every listing call fails.
    pub fn fail_list(&self) {
        self.fail_list_after(0);
    }

    /// Listing calls fail once `pages` calls have succeeded.
    pub fn fail_list_after(&self, pages: usize) {
        self.faults.lock().list_after = Some(pages);
    }

    pub fn fail_put(&self) {
        self.faults.lock().put = true;
    }

    /// Remove all injected faults.
    pub fn heal(&self) {
        *self.faults.lock() = Faults::default();
    }

    pub fn list_calls(&self) -> usize {
        self.calls.lock().list
    }

    pub fn get_calls(&self) -> usize {
        self.calls.lock().get.len()
    }

    pub fn put_calls(&self) -> usize {
        self.calls.lock().put.len()
    }

    pub fn delete_calls(&self) -> usize {
        self.calls.lock().delete.len()
    }

    /// Keys passed to `get`, in call order.
    pub fn fetched_keys(&self) -> Vec<String> {
        self.calls.lock().get.clone()
    }

    /// Keys passed to `delete`, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.calls.lock().delete.clone()
    }
}

#[async_trait]
impl ObjectStore for FaultInjectingStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let done = {
            let mut calls = self.calls.lock();
            calls.list += 1;
            calls.list - 1
        };
        if matches!(self.faults.lock().list_after, Some(limit) if done >= limit) {
            return Err(StoreError::Injected(format!("list {}", prefix)));
        }
        self.inner.list_page(prefix, continuation).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.calls.lock().get.push(key.to_string());
        if self.faults.lock().get_keys.contains(key) {
            return Err(StoreError::Injected(format!("get {}", key)));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> Result<(), StoreError> {
        self.calls.lock().put.push(key.to_string());
        if self.faults.lock().put {
            return Err(StoreError::Injected(format!("put {}", key)));
        }
        self.inner.put(key, body, options).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.calls.lock().delete.push(key.to_string());
        if self.faults.lock().delete_keys.contains(key) {
            return Err(StoreError::Injected(format!("delete {}", key)));
        }
        self.inner.delete(key).await
    }
}

/// Metrics sink that remembers everything it was told.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    operations: Mutex<Vec<(RegistryOp, OpOutcome)>>,
    errors: Mutex<Vec<(RegistryOp, RegistryError)>>,
    rounds: Mutex<Vec<(usize, usize)>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> Vec<(RegistryOp, OpOutcome)> {
        self.operations.lock().clone()
    }

    pub fn errors(&self) -> Vec<(RegistryOp, RegistryError)> {
        self.errors.lock().clone()
    }

    /// `(delivered, cached)` per read round.
    pub fn rounds(&self) -> Vec<(usize, usize)> {
        self.rounds.lock().clone()
    }

    /// Outcome of the most recent `op`.
    pub fn last_outcome(&self, op: RegistryOp) -> Option<OpOutcome> {
        self.operations
            .lock()
            .iter()
            .rev()
            .find(|(recorded, _)| *recorded == op)
            .map(|(_, outcome)| *outcome)
    }
}

impl DiscoveryMetrics for RecordingMetrics {
    fn record_operation(&self, op: RegistryOp, outcome: OpOutcome) {
        self.operations.lock().push((op, outcome));
    }

    fn record_error(&self, op: RegistryOp, error: &RegistryError) {
        self.errors.lock().push((op, error.clone()));
    }

    fn record_read_round(&self, delivered: usize, cached: usize) {
        self.rounds.lock().push((delivered, cached));
    }
}

/// Member record for `address` named `name` on `10.0.0.<n>:7800`.
pub fn peer(address: NodeAddress, name: &str, n: u8) -> PeerRecord {
    PeerRecord::new(address, name, format!("10.0.0.{}:7800", n))
}

/// Text-codec registry for `local` over `store`.
pub fn registry_on(
    store: Arc<dyn ObjectStore>,
    config: RegistryConfig,
    local: NodeAddress,
) -> BucketRegistry {
    BucketRegistry::new(store, Arc::new(TextRecordCodec), config, local)
}
