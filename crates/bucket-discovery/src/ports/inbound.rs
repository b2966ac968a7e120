//! # Driving Ports (Inbound API)
//!
//! The upward interface consumed by the membership engine.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::{NodeAddress, PeerRecord};

/// Accumulator handed to [`DiscoveryBackend::read_all`].
///
/// Receives every record that passed the caller's filter, tagged with the
/// record's own coordinator flag.
pub trait ResponseSink {
    fn add_response(&mut self, record: PeerRecord, is_coordinator: bool);
}

/// Capability implemented by every discovery backend.
///
/// None of the methods return errors. Storage, codec and naming failures are
/// logged and counted; the membership engine simply sees fewer records (or
/// none) and tries again on its next round.
///
/// A blank `group` means "absent": the call is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// use bucket_discovery::{DiscoveryBackend, Responses};
///
/// async fn discover(backend: &dyn DiscoveryBackend) -> Responses {
///     let mut responses = Responses::new();
///     backend.read_all(None, "g1", &mut responses).await;
///     responses
/// }
/// ```
#[async_trait]
pub trait DiscoveryBackend: Send + Sync {
    /// Discover every peer that advertised under `group`.
    ///
    /// # Arguments
    ///
    /// * `known_members` - Only these addresses reach the sink (`None` = all)
    /// * `group` - Group name
    /// * `sink` - Receives the accepted records
    async fn read_all(
        &self,
        known_members: Option<&HashSet<NodeAddress>>,
        group: &str,
        sink: &mut (dyn ResponseSink + Send),
    );

    /// Overwrite the local node's advertisement with `records`.
    async fn write(&self, records: &[PeerRecord], group: &str);

    /// Delete the advertisement of `address` (graceful leave).
    async fn remove(&self, group: &str, address: &NodeAddress);

    /// Delete every advertisement in `group`, regardless of owner.
    async fn remove_all(&self, group: &str);

    /// Short identifier used in logs (e.g. `"s3"`).
    fn backend_name(&self) -> &str;
}
