//! Discovery responses collected during a read round.

use super::entities::{NodeAddress, PeerRecord};
use crate::ports::ResponseSink;

/// One accepted record plus the coordinator tag it was submitted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub record: PeerRecord,
    pub is_coordinator: bool,
}

/// Default [`ResponseSink`]: keeps the latest response per address.
///
/// A node may show up more than once when several objects carry its record
/// (e.g. a stale key from an earlier address scheme). The later submission
/// replaces the earlier one in place, keeping first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Responses {
    entries: Vec<Response>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.entries.iter()
    }

    /// Response for `address`, if any was submitted.
    pub fn get(&self, address: &NodeAddress) -> Option<&Response> {
        self.entries.iter().find(|r| &r.record.address == address)
    }

    pub fn contains(&self, address: &NodeAddress) -> bool {
        self.get(address).is_some()
    }

    /// Records submitted with the coordinator tag.
    pub fn coordinators(&self) -> Vec<&PeerRecord> {
        self.entries
            .iter()
            .filter(|r| r.is_coordinator)
            .map(|r| &r.record)
            .collect()
    }

    /// Addresses of every accepted record.
    pub fn addresses(&self) -> Vec<NodeAddress> {
        self.entries.iter().map(|r| r.record.address).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_records(self) -> Vec<PeerRecord> {
        self.entries.into_iter().map(|r| r.record).collect()
    }
}

impl ResponseSink for Responses {
    fn add_response(&mut self, record: PeerRecord, is_coordinator: bool) {
        let response = Response {
            record,
            is_coordinator,
        };
        match self
            .entries
            .iter_mut()
            .find(|r| r.record.address == response.record.address)
        {
            Some(existing) => *existing = response,
            None => self.entries.push(response),
        }
    }
}
