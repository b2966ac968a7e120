//! # Heartbeat
//!
//! Keeps the local record fresh and derives the current view.
//!
//! Each beat writes the local record, reads the whole group back and picks
//! the coordinator: the lowest address in the observed view (self included).
//! When the coordinator flag of the local node flips it is written again
//! right away so peers see it on their next beat.

use std::sync::Arc;
use std::time::Duration;

use bucket_discovery::{DiscoveryBackend, NodeAddress, PeerRecord, Responses};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Membership as seen by one beat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Every member observed, ordered by address.
    pub members: Vec<PeerRecord>,
    pub coordinator: NodeAddress,
}

impl View {
    /// Build a view from a read round. `local` is always part of it.
    pub fn from_responses(responses: Responses, local: &PeerRecord) -> Self {
        let mut members = responses.into_records();
        if !members.iter().any(|m| m.address == local.address) {
            members.push(local.clone());
        }
        members.sort_by_key(|m| m.address);

        // `members` holds at least `local`.
        let coordinator = members[0].address;
        Self {
            members,
            coordinator,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, address: &NodeAddress) -> bool {
        self.members.iter().any(|m| &m.address == address)
    }
}

/// Periodic write-then-read driver for one node in one group.
pub struct Heartbeat {
    backend: Arc<dyn DiscoveryBackend>,
    group: String,
    local: PeerRecord,
    interval: Duration,
    remove_on_shutdown: bool,
}

impl Heartbeat {
    pub fn new(
        backend: Arc<dyn DiscoveryBackend>,
        group: impl Into<String>,
        local: PeerRecord,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            group: group.into(),
            local,
            interval,
            remove_on_shutdown: true,
        }
    }

    #[must_use]
    pub fn remove_on_shutdown(mut self, remove: bool) -> Self {
        self.remove_on_shutdown = remove;
        self
    }

    pub fn local(&self) -> &PeerRecord {
        &self.local
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// One beat: publish, read back, recompute the coordinator.
    pub async fn beat(&mut self) -> View {
        self.publish().await;

        let mut responses = Responses::new();
        self.backend
            .read_all(None, &self.group, &mut responses)
            .await;
        let view = View::from_responses(responses, &self.local);

        let is_coordinator = view.coordinator == self.local.address;
        if is_coordinator != self.local.is_coordinator {
            self.local.is_coordinator = is_coordinator;
            info!(
                group = %self.group,
                address = %self.local.address,
                is_coordinator,
                "coordinator role changed"
            );
            self.publish().await;
        }

        debug!(
            group = %self.group,
            members = view.size(),
            coordinator = %view.coordinator,
            "view refreshed"
        );
        view
    }

    /// Beat every interval until `shutdown` turns true or its sender drops.
    ///
    /// Returns the last view observed, if any beat completed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Option<View> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = None;

        info!(
            group = %self.group,
            address = %self.local.address,
            interval_ms = self.interval.as_millis() as u64,
            backend = self.backend.backend_name(),
            "heartbeat started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    last = Some(self.beat().await);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if self.remove_on_shutdown {
            self.leave().await;
        }
        info!(group = %self.group, "heartbeat stopped");
        last
    }

    /// Delete the local record.
    pub async fn leave(&self) {
        self.backend
            .remove(&self.group, &self.local.address)
            .await;
        info!(group = %self.group, address = %self.local.address, "left group");
    }

    async fn publish(&self) {
        self.backend
            .write(std::slice::from_ref(&self.local), &self.group)
            .await;
    }
}
