//! # Backend Table
//!
//! Static mapping from the `[store] backend` name to a store constructor.
//! Adding a backend means adding one row to [`BACKENDS`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bucket_discovery::{
    BucketRegistry, Credentials, DiscoveryMetrics, FileObjectStore, InMemoryObjectStore,
    NodeAddress, ObjectStore, S3Config, S3ObjectStore, StoreError,
};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, RuntimeConfig};

/// Errors raised while turning configuration into a live registry.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown backend '{0}'")]
    Unknown(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open {backend} store: {source}")]
    Store {
        backend: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type StoreFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Arc<dyn ObjectStore>, BackendError>> + Send + 'a>>;

/// Builds an object store from the runtime configuration.
pub type BackendCtor = for<'a> fn(&'a RuntimeConfig) -> StoreFuture<'a>;

/// Every backend the runtime knows how to open.
pub static BACKENDS: &[(&str, BackendCtor)] = &[
    ("s3", open_s3),
    ("file", open_file),
    ("memory", open_memory),
];

/// Constructor registered under `name`.
pub fn lookup(name: &str) -> Option<BackendCtor> {
    BACKENDS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, ctor)| *ctor)
}

pub fn backend_names() -> Vec<&'static str> {
    BACKENDS.iter().map(|(name, _)| *name).collect()
}

/// Open the configured store.
pub async fn open_store(config: &RuntimeConfig) -> Result<Arc<dyn ObjectStore>, BackendError> {
    let ctor = lookup(&config.store.backend)
        .ok_or_else(|| BackendError::Unknown(config.store.backend.clone()))?;
    ctor(config).await
}

/// Wire a registry around an already opened store.
pub fn assemble_registry(
    store: Arc<dyn ObjectStore>,
    config: &RuntimeConfig,
    local: NodeAddress,
    metrics: Arc<dyn DiscoveryMetrics>,
) -> Result<BucketRegistry, BackendError> {
    let registry = BucketRegistry::new(
        store,
        config.codec_kind()?.build(),
        config.registry_config()?,
        local,
    )
    .with_name(config.store.backend.clone())
    .with_metrics(metrics);
    Ok(registry)
}

/// Open the configured store and wire a registry around it.
pub async fn build_registry(
    config: &RuntimeConfig,
    local: NodeAddress,
    metrics: Arc<dyn DiscoveryMetrics>,
) -> Result<BucketRegistry, BackendError> {
    let store = open_store(config).await?;
    assemble_registry(store, config, local, metrics)
}

fn open_s3(config: &RuntimeConfig) -> StoreFuture<'_> {
    Box::pin(async move {
        let section = &config.store.s3;
        let missing = |field: &str| {
            BackendError::Config(ConfigError::Invalid(format!(
                "store.s3.{} is required for the s3 backend",
                field
            )))
        };
        let bucket = section.bucket.clone().ok_or_else(|| missing("bucket"))?;
        let region = section.region.clone().ok_or_else(|| missing("region"))?;

        let mut s3 = S3Config::new(bucket, region).path_style(section.path_style);
        s3.request_timeout = std::time::Duration::from_secs(section.request_timeout_secs.max(1));
        if let Some(endpoint) = &section.endpoint {
            s3 = s3.endpoint(endpoint.clone());
        }
        if let (Some(id), Some(secret)) = (&section.access_key_id, &section.secret_access_key) {
            let mut credentials = Credentials::new(id.clone(), secret.clone());
            credentials.session_token = section.session_token.clone();
            s3 = s3.credentials(credentials);
        }

        let store = S3ObjectStore::new(s3).map_err(|source| BackendError::Store {
            backend: "s3",
            source,
        })?;
        if section.create_bucket {
            store
                .ensure_bucket()
                .await
                .map_err(|source| BackendError::Store {
                    backend: "s3",
                    source,
                })?;
        }
        info!(bucket = %store.bucket(), "s3 store ready");
        Ok(Arc::new(store) as Arc<dyn ObjectStore>)
    })
}

fn open_file(config: &RuntimeConfig) -> StoreFuture<'_> {
    Box::pin(async move {
        let root = config.store.file.root.clone().ok_or_else(|| {
            ConfigError::Invalid("store.file.root is required for the file backend".into())
        })?;
        let store = FileObjectStore::open(root)
            .await
            .map_err(|source| BackendError::Store {
                backend: "file",
                source,
            })?;
        info!(root = %store.root().display(), "file store ready");
        Ok(Arc::new(store) as Arc<dyn ObjectStore>)
    })
}

fn open_memory(config: &RuntimeConfig) -> StoreFuture<'_> {
    Box::pin(async move {
        let store = match config.store.memory.page_size {
            Some(size) => InMemoryObjectStore::with_page_size(size),
            None => InMemoryObjectStore::new(),
        };
        info!("in-memory store ready (process local)");
        Ok(Arc::new(store) as Arc<dyn ObjectStore>)
    })
}
