//! In-memory object store.
//!
//! Ordered map of key -> object. Optionally splits listings into pages of a
//! fixed size to exercise continuation-token handling.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::domain::StoreError;
use crate::ports::{ListPage, ObjectStore, ObjectSummary, PutOptions};

/// An object as stored, including its write metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub options: PutOptions,
}

/// [`ObjectStore`] held entirely in memory.
///
/// Continuation tokens are the last key of the previous page, so listing
/// behaves like S3's `start-after`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    page_size: Option<usize>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return at most `page_size` entries per listing page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: RwLock::default(),
            page_size: Some(page_size.max(1)),
        }
    }

    /// Store raw bytes under `key`, bypassing any codec. Empty bodies model
    /// placeholder objects.
    pub fn insert_raw(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects.write().insert(
            key.into(),
            StoredObject {
                body: body.into(),
                options: PutOptions::default(),
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().get(key).cloned()
    }

    /// All keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let objects = self.objects.read();
        let lower = match continuation {
            Some(token) => Bound::Excluded(token.to_string()),
            None => Bound::Included(prefix.to_string()),
        };
        let limit = self.page_size.unwrap_or(usize::MAX);

        let mut matching = objects
            .range((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary::new(key.clone(), object.body.len() as u64));

        let page: Vec<ObjectSummary> = matching.by_ref().take(limit).collect();
        let next_continuation = match (matching.next(), page.last()) {
            (Some(_), Some(last)) => Some(last.key.clone()),
            _ => None,
        };

        Ok(ListPage {
            objects: page,
            next_continuation,
        })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .read()
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> Result<(), StoreError> {
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body,
                options: options.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.objects.write().remove(key);
        Ok(())
    }
}
