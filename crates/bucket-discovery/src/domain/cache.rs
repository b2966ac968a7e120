//! Side discovery cache.
//!
//! Every non-self record seen during a read round lands here, whether or not
//! it passed the caller's member filter. The membership engine shares the
//! same `Arc<DiscoveryCache>` and uses it to reach peers directly without
//! another discovery round.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::entities::NodeAddress;

/// What the cache remembers about a possible peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPeer {
    pub logical_name: String,
    pub physical_addr: String,
}

/// Thread-safe address -> (logical name, physical address) map.
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    peers: RwLock<HashMap<NodeAddress, CachedPeer>>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a possible peer.
    pub fn add_possible_member(
        &self,
        address: NodeAddress,
        logical_name: impl Into<String>,
        physical_addr: impl Into<String>,
    ) {
        self.peers.write().insert(
            address,
            CachedPeer {
                logical_name: logical_name.into(),
                physical_addr: physical_addr.into(),
            },
        );
    }

    pub fn get(&self, address: &NodeAddress) -> Option<CachedPeer> {
        self.peers.read().get(address).cloned()
    }

    pub fn logical_name(&self, address: &NodeAddress) -> Option<String> {
        self.peers.read().get(address).map(|p| p.logical_name.clone())
    }

    pub fn physical_addr(&self, address: &NodeAddress) -> Option<String> {
        self.peers.read().get(address).map(|p| p.physical_addr.clone())
    }

    pub fn contains(&self, address: &NodeAddress) -> bool {
        self.peers.read().contains_key(address)
    }

    /// Forget a peer (e.g. after it left the view).
    pub fn remove(&self, address: &NodeAddress) -> Option<CachedPeer> {
        self.peers.write().remove(address)
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> HashMap<NodeAddress, CachedPeer> {
        self.peers.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_refresh() {
        let cache = DiscoveryCache::new();
        let addr = NodeAddress::random();

        cache.add_possible_member(addr, "B", "10.0.0.2:7800");
        assert_eq!(cache.physical_addr(&addr).as_deref(), Some("10.0.0.2:7800"));

        cache.add_possible_member(addr, "B", "10.0.0.2:7900");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.physical_addr(&addr).as_deref(), Some("10.0.0.2:7900"));
        assert_eq!(cache.logical_name(&addr).as_deref(), Some("B"));
    }

    #[test]
    fn test_remove() {
        let cache = DiscoveryCache::new();
        let addr = NodeAddress::random();
        cache.add_possible_member(addr, "B", "h:1");

        assert!(cache.remove(&addr).is_some());
        assert!(cache.is_empty());
        assert!(!cache.contains(&addr));
    }
}
