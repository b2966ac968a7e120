//! # Domain Errors
//!
//! Error types for the discovery registry.
//!
//! None of these ever cross the upward [`DiscoveryBackend`] boundary: the
//! registry logs them and reports them to the metrics port. They exist so that
//! adapters and internal helpers can use `?` and so tests can assert on causes.
//!
//! [`DiscoveryBackend`]: crate::ports::DiscoveryBackend

use thiserror::Error;

/// Errors raised by an [`ObjectStore`](crate::ports::ObjectStore) adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Key does not exist.
    #[error("object not found: {key}")]
    NotFound {
        /// Missing key.
        key: String,
    },

    /// Credentials were rejected or the policy denies the operation.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Store could not be reached (connection, DNS, timeout).
    #[error("object store unavailable: {0}")]
    Unavailable(String),

    /// Unexpected HTTP status from an HTTP-backed store.
    #[error("unexpected status {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// Response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local filesystem failure.
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path the operation touched.
        path: String,
        /// OS error text.
        message: String,
    },

    /// Failure injected by a test double.
    #[error("injected failure: {0}")]
    Injected(String),
}

/// Errors raised while encoding or decoding peer records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload is not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// A text line did not match `<name> <address> <physical> <T|F>`.
    #[error("malformed record on line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// JSON payload could not be parsed or produced.
    #[error("json codec error: {0}")]
    Json(String),

    /// Payload declares a format version this build does not understand.
    #[error("unsupported record format version {0}")]
    UnsupportedVersion(u32),
}

/// Errors raised by key naming and identity parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Group name is empty or whitespace only.
    #[error("group name is empty")]
    EmptyGroup,

    /// Text is not a valid node address.
    #[error("invalid node address: {0}")]
    InvalidAddress(String),
}

/// Umbrella error used inside the registry service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Storage adapter failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Record encoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Key naming failure.
    #[error(transparent)]
    Key(#[from] KeyError),
}
