//! Value Objects for Bucket Discovery
//!
//! Registry configuration. Everything here is owned by an external config
//! loader; the registry only reads it.

use super::keys::KeyPrefix;

/// How many listing pages a read or remove-all round consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingMode {
    /// Follow continuation tokens until the listing is exhausted.
    #[default]
    Exhaustive,
    /// Only ever look at the first page. Groups larger than one page are
    /// silently truncated.
    SinglePage,
}

impl ListingMode {
    /// Parse `"exhaustive"` / `"single-page"` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exhaustive" | "all" => Some(Self::Exhaustive),
            "single-page" | "single_page" | "first-page" => Some(Self::SinglePage),
            _ => None,
        }
    }
}

/// Write-path metadata. Never affects how records are read back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Grant the bucket owner full control over every written object.
    /// Useful when writers live in other accounts than the bucket.
    pub grant_bucket_owner_full_control: bool,
    /// Server-side encryption with this KMS key id.
    pub kms_key_id: Option<String>,
}

/// Configuration consumed by [`BucketRegistry`](crate::service::BucketRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Namespace prefix in front of every group key.
    pub prefix: KeyPrefix,
    /// Listing pagination behavior.
    pub listing: ListingMode,
    /// Metadata attached to every write.
    pub write: WriteOptions,
}

impl RegistryConfig {
    /// Config with the given (raw, un-normalized) prefix and defaults elsewhere.
    pub fn with_prefix(raw_prefix: &str) -> Self {
        Self {
            prefix: KeyPrefix::normalize(Some(raw_prefix)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn listing(mut self, mode: ListingMode) -> Self {
        self.listing = mode;
        self
    }

    #[must_use]
    pub fn write_options(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }
}
