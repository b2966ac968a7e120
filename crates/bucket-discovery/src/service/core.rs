use std::sync::Arc;
use tracing::debug;

use crate::domain::{group_prefix, DiscoveryCache, GroupName, NodeAddress, RegistryConfig};
use crate::ports::{DiscoveryMetrics, NoOpMetrics, ObjectStore, RecordCodec, RegistryOp};

/// Discovery registry backed by an object store.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use bucket_discovery::{
///     BucketRegistry, InMemoryObjectStore, NodeAddress, RegistryConfig, TextRecordCodec,
/// };
///
/// let registry = BucketRegistry::new(
///     Arc::new(InMemoryObjectStore::new()),
///     Arc::new(TextRecordCodec),
///     RegistryConfig::with_prefix("jgroups"),
///     NodeAddress::random(),
/// );
/// ```
pub struct BucketRegistry {
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) codec: Arc<dyn RecordCodec>,
    pub(crate) config: RegistryConfig,
    /// Address of the node this registry runs on.
    pub(crate) local_address: NodeAddress,
    /// Shared with the membership engine.
    pub(crate) cache: Arc<DiscoveryCache>,
    pub(crate) metrics: Arc<dyn DiscoveryMetrics>,
    pub(crate) name: String,
}

impl BucketRegistry {
    /// Create a registry with a private discovery cache and no metrics.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        codec: Arc<dyn RecordCodec>,
        config: RegistryConfig,
        local_address: NodeAddress,
    ) -> Self {
        Self {
            store,
            codec,
            config,
            local_address,
            cache: Arc::new(DiscoveryCache::new()),
            metrics: Arc::new(NoOpMetrics),
            name: "bucket".to_string(),
        }
    }

    /// Share an existing discovery cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn DiscoveryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Backend name reported in logs.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn local_address(&self) -> NodeAddress {
        self.local_address
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<DiscoveryCache> {
        &self.cache
    }

    pub(crate) fn prefix_for(&self, group: &GroupName) -> String {
        group_prefix(&self.config.prefix, group)
    }

    /// Validate the raw group name; blank means "absent" and the caller skips
    /// the operation.
    pub(crate) fn resolve_group(&self, raw: &str, op: RegistryOp) -> Option<GroupName> {
        match GroupName::parse(raw) {
            Ok(group) => Some(group),
            Err(_) => {
                debug!(backend = %self.name, op = op.as_str(), "no group name, skipping");
                None
            }
        }
    }
}

impl std::fmt::Debug for BucketRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketRegistry")
            .field("name", &self.name)
            .field("local_address", &self.local_address)
            .field("config", &self.config)
            .field("content_type", &self.codec.content_type())
            .finish()
    }
}
