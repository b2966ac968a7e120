//! # Runtime Configuration
//!
//! TOML file plus environment overrides.
//!
//! ```toml
//! [registry]
//! group = "cluster-a"
//! prefix = "jgroups"
//! listing = "exhaustive"            # or "single-page"
//! grant_bucket_owner_full_control = false
//! # kms_key_id = "arn:aws:kms:..."
//!
//! [store]
//! backend = "s3"                    # "s3" | "file" | "memory"
//!
//! [store.s3]
//! bucket = "my-discovery-bucket"
//! region = "eu-west-1"
//! # endpoint = "http://localhost:9000"
//! path_style = false
//! create_bucket = true              # HEAD the bucket at startup, create if missing
//!
//! [store.file]
//! root = "/mnt/shared/bucket-ping"
//!
//! [codec]
//! format = "text"                   # or "json"
//!
//! [heartbeat]
//! interval_secs = 5
//! remove_on_shutdown = true
//!
//! [node]
//! name = "node-a"
//! physical_addr = "10.0.0.5:7800"
//! # address = "6f1c..."            # random when absent
//! ```
//!
//! Environment overrides: `BP_GROUP`, `BP_BACKEND`, `BP_BUCKET_PREFIX`,
//! `BP_S3_BUCKET`, `BP_S3_REGION`, `BP_S3_ENDPOINT`, `BP_FILE_ROOT`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use bucket_discovery::{
    CodecKind, KeyPrefix, ListingMode, NodeAddress, RegistryConfig, WriteOptions,
};

use crate::backends;

/// Errors that can occur during config loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Semantically invalid configuration.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub registry: RegistrySection,
    pub store: StoreSection,
    pub codec: CodecSection,
    pub heartbeat: HeartbeatSection,
    pub node: NodeSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Group (cluster) name.
    pub group: String,
    /// Namespace prefix inside the bucket.
    pub prefix: Option<String>,
    /// `"exhaustive"` or `"single-page"`.
    pub listing: String,
    pub grant_bucket_owner_full_control: bool,
    pub kms_key_id: Option<String>,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            group: "bucket-ping".to_string(),
            prefix: None,
            listing: "exhaustive".to_string(),
            grant_bucket_owner_full_control: false,
            kms_key_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Key into the static backend table.
    pub backend: String,
    pub s3: S3Section,
    pub file: FileSection,
    pub memory: MemorySection,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: "s3".to_string(),
            s3: S3Section::default(),
            file: FileSection::default(),
            memory: MemorySection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct S3Section {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub path_style: bool,
    /// Create the bucket at startup when it does not exist.
    pub create_bucket: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for S3Section {
    fn default() -> Self {
        Self {
            bucket: None,
            region: None,
            endpoint: None,
            path_style: false,
            create_bucket: true,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSection {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    /// Simulated listing page size.
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodecSection {
    /// `"text"` or `"json"`.
    pub format: String,
}

impl Default for CodecSection {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeartbeatSection {
    pub interval_secs: u64,
    /// Delete the local record when the loop stops.
    pub remove_on_shutdown: bool,
}

impl Default for HeartbeatSection {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            remove_on_shutdown: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Fixed node address; random per process when absent.
    pub address: Option<String>,
    pub name: String,
    pub physical_addr: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            address: None,
            name: "bucket-ping".to_string(),
            physical_addr: "127.0.0.1:7800".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `BP_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(group) = get("BP_GROUP") {
            self.registry.group = group;
        }
        if let Some(backend) = get("BP_BACKEND") {
            self.store.backend = backend;
        }
        if let Some(prefix) = get("BP_BUCKET_PREFIX") {
            self.registry.prefix = Some(prefix);
        }
        if let Some(bucket) = get("BP_S3_BUCKET") {
            self.store.s3.bucket = Some(bucket);
        }
        if let Some(region) = get("BP_S3_REGION") {
            self.store.s3.region = Some(region);
        }
        if let Some(endpoint) = get("BP_S3_ENDPOINT") {
            self.store.s3.endpoint = Some(endpoint);
        }
        if let Some(root) = get("BP_FILE_ROOT") {
            self.store.file.root = Some(PathBuf::from(root));
        }
    }

    /// Check everything that can be checked without touching the store.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.registry.group.trim().is_empty() {
            return invalid("registry.group must not be empty".into());
        }
        self.listing_mode()?;
        self.codec_kind()?;
        self.node_address()?;
        if self.heartbeat.interval_secs == 0 {
            return invalid("heartbeat.interval_secs must be positive".into());
        }

        match self.store.backend.as_str() {
            "s3" => {
                if self.store.s3.bucket.as_deref().map_or(true, str::is_empty) {
                    return invalid("store.s3.bucket is required for the s3 backend".into());
                }
                if self.store.s3.region.as_deref().map_or(true, str::is_empty) {
                    return invalid("store.s3.region is required for the s3 backend".into());
                }
            }
            "file" => {
                if self.store.file.root.is_none() {
                    return invalid("store.file.root is required for the file backend".into());
                }
            }
            other if backends::lookup(other).is_none() => {
                return invalid(format!(
                    "unknown backend '{}' (known: {})",
                    other,
                    backends::backend_names().join(", ")
                ));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn listing_mode(&self) -> Result<ListingMode, ConfigError> {
        ListingMode::parse(&self.registry.listing).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown listing mode '{}'", self.registry.listing))
        })
    }

    pub fn codec_kind(&self) -> Result<CodecKind, ConfigError> {
        CodecKind::parse(&self.codec.format).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown codec format '{}'", self.codec.format))
        })
    }

    /// Configured address, or `None` when a random one should be used.
    pub fn node_address(&self) -> Result<Option<NodeAddress>, ConfigError> {
        self.node
            .address
            .as_deref()
            .map(|raw| {
                raw.parse()
                    .map_err(|_| ConfigError::Invalid(format!("invalid node.address '{}'", raw)))
            })
            .transpose()
    }

    /// Core registry configuration derived from `[registry]`.
    pub fn registry_config(&self) -> Result<RegistryConfig, ConfigError> {
        Ok(RegistryConfig {
            prefix: KeyPrefix::normalize(self.registry.prefix.as_deref()),
            listing: self.listing_mode()?,
            write: WriteOptions {
                grant_bucket_owner_full_control: self.registry.grant_bucket_owner_full_control,
                kms_key_id: self.registry.kms_key_id.clone(),
            },
        })
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat.interval_secs)
    }
}
