//! # Discovery Flows
//!
//! Several nodes sharing one store, each with its own registry:
//!
//! 1. **Shared directory:** independent file stores over the same root
//! 2. **Mixed codecs:** a foreign payload ends the round
//! 3. **Purge under faults:** remove-all survives a failing delete
//! 4. **Metrics:** registry outcomes reach the Prometheus counters

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use uuid::Uuid;

    use bucket_discovery::test_utils::{peer, registry_on, FaultInjectingStore, RecordingMetrics};
    use bucket_discovery::{
        object_key, BucketRegistry, CodecKind, DiscoveryBackend, DiscoveryCache,
        FileObjectStore, GroupName, InMemoryObjectStore, KeyPrefix, NodeAddress, OpOutcome,
        RegistryConfig, RegistryOp, Responses,
    };
    use bucket_telemetry::{PrometheusDiscoveryMetrics, OPERATIONS};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn addr(n: u128) -> NodeAddress {
        NodeAddress::new(Uuid::from_u128(n))
    }

    async fn file_registry(root: &std::path::Path, local: NodeAddress) -> BucketRegistry {
        let store = FileObjectStore::open(root).await.unwrap();
        BucketRegistry::new(
            Arc::new(store),
            CodecKind::Text.build(),
            RegistryConfig::with_prefix("jgroups"),
            local,
        )
        .with_name("file")
    }

    // =============================================================================
    // SHARED DIRECTORY
    // =============================================================================

    /// Three writers and a fourth reader, each with its own store handle.
    #[tokio::test]
    async fn test_file_store_rendezvous() {
        let dir = tempfile::tempdir().unwrap();
        let writers = [addr(1), addr(2), addr(3)];

        for (i, a) in writers.iter().enumerate() {
            let registry = file_registry(dir.path(), *a).await;
            registry
                .write(&[peer(*a, &format!("node-{}", i), i as u8 + 1)], "cluster")
                .await;
        }

        let reader = file_registry(dir.path(), addr(9)).await;
        let mut responses = Responses::new();
        reader.read_all(None, "cluster", &mut responses).await;

        assert_eq!(responses.len(), 3);
        for a in &writers {
            assert!(responses.contains(a));
            assert!(reader.cache().contains(a));
        }

        // A restricted view still fills the cache with everyone.
        let known: HashSet<NodeAddress> = [addr(2)].into_iter().collect();
        let fresh = file_registry(dir.path(), addr(10)).await;
        let mut filtered = Responses::new();
        fresh.read_all(Some(&known), "cluster", &mut filtered).await;
        assert_eq!(filtered.addresses(), vec![addr(2)]);
        assert_eq!(fresh.cache().len(), 3);
    }

    #[tokio::test]
    async fn test_file_store_leave_and_purge() {
        let dir = tempfile::tempdir().unwrap();
        let a = file_registry(dir.path(), addr(1)).await;
        let b = file_registry(dir.path(), addr(2)).await;
        a.write(&[peer(addr(1), "a", 1)], "cluster").await;
        b.write(&[peer(addr(2), "b", 2)], "cluster").await;
        b.write(&[peer(addr(2), "b", 2)], "other").await;

        a.remove("cluster", &addr(1)).await;
        let mut responses = Responses::new();
        b.read_all(None, "cluster", &mut responses).await;
        assert_eq!(responses.addresses(), vec![addr(2)]);

        a.remove_all("cluster").await;
        let mut after = Responses::new();
        b.read_all(None, "cluster", &mut after).await;
        assert!(after.is_empty());

        let mut untouched = Responses::new();
        b.read_all(None, "other", &mut untouched).await;
        assert_eq!(untouched.len(), 1);
    }

    // =============================================================================
    // MIXED CODECS
    // =============================================================================

    /// Keys sort by address, so the text record at 1 is read before the
    /// JSON record at 2 stops the round; 3 is never reached.
    #[tokio::test]
    async fn test_foreign_payload_stops_the_round() {
        let store = Arc::new(InMemoryObjectStore::new());
        let text = |local| {
            BucketRegistry::new(
                store.clone(),
                CodecKind::Text.build(),
                RegistryConfig::default(),
                local,
            )
        };
        let json = BucketRegistry::new(
            store.clone(),
            CodecKind::Json.build(),
            RegistryConfig::default(),
            addr(2),
        );

        text(addr(1)).write(&[peer(addr(1), "a", 1)], "g").await;
        json.write(&[peer(addr(2), "b", 2)], "g").await;
        text(addr(3)).write(&[peer(addr(3), "c", 3)], "g").await;

        let reader = text(addr(9));
        let mut responses = Responses::new();
        let report = reader.read_with_report(None, "g", &mut responses).await;

        assert_eq!(responses.addresses(), vec![addr(1)]);
        assert!(report.stopped_early);
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_partial_round() {
        let store = Arc::new(FaultInjectingStore::new());
        for n in 1..=3u8 {
            let a = addr(n as u128);
            registry_on(store.clone(), RegistryConfig::default(), a)
                .write(&[peer(a, "n", n)], "g")
                .await;
        }
        let group = GroupName::parse("g").unwrap();
        store.fail_get(object_key(&KeyPrefix::empty(), &group, &addr(2)));

        let reader = registry_on(store.clone(), RegistryConfig::default(), addr(9));
        let mut responses = Responses::new();
        let report = reader.read_with_report(None, "g", &mut responses).await;

        assert!(report.is_partial());
        assert_eq!(report.skipped_failed, 1);
        assert_eq!(responses.addresses(), vec![addr(1), addr(3)]);
    }

    // =============================================================================
    // PURGE UNDER FAULTS
    // =============================================================================

    #[tokio::test]
    async fn test_purge_with_failing_delete_then_retry() {
        let store = Arc::new(FaultInjectingStore::with_page_size(2));
        let metrics = Arc::new(RecordingMetrics::new());
        let registry = registry_on(store.clone(), RegistryConfig::default(), addr(100))
            .with_metrics(metrics.clone());

        for n in 1..=5u8 {
            let a = addr(n as u128);
            registry_on(store.clone(), RegistryConfig::default(), a)
                .write(&[peer(a, "n", n)], "g")
                .await;
        }

        let victim = object_key(&KeyPrefix::empty(), &GroupName::parse("g").unwrap(), &addr(3));
        store.fail_delete(victim.clone());
        registry.remove_all("g").await;

        assert_eq!(metrics.last_outcome(RegistryOp::RemoveAll), Some(OpOutcome::Partial));
        assert_eq!(store.inner().keys(), vec![victim]);

        store.heal();
        registry.remove_all("g").await;
        let mut responses = Responses::new();
        registry.read_all(None, "g", &mut responses).await;
        assert!(responses.is_empty());
        assert_eq!(metrics.last_outcome(RegistryOp::RemoveAll), Some(OpOutcome::Success));
    }

    // =============================================================================
    // METRICS
    // =============================================================================

    #[tokio::test]
    async fn test_prometheus_counts_operations() {
        let metrics = Arc::new(PrometheusDiscoveryMetrics::new().unwrap());
        let store = Arc::new(InMemoryObjectStore::new());
        let registry = registry_on(store, RegistryConfig::default(), addr(1))
            .with_metrics(metrics);

        let writes = || OPERATIONS.with_label_values(&["write", "success"]).get();
        let before = writes();
        registry.write(&[peer(addr(1), "a", 1)], "metrics-g").await;
        // Other tests share the global registry; only require growth.
        assert!(writes() >= before + 1.0);
    }

    /// A cache handed in from outside sees every peer the registry reads.
    #[tokio::test]
    async fn test_shared_cache_for_membership_layer() {
        let store = Arc::new(InMemoryObjectStore::new());
        let cache = Arc::new(DiscoveryCache::new());
        let registry = registry_on(store.clone(), RegistryConfig::default(), addr(1))
            .with_cache(cache.clone());

        registry_on(store.clone(), RegistryConfig::default(), addr(2))
            .write(&[peer(addr(2), "b", 2)], "g")
            .await;

        let mut responses = Responses::new();
        registry.read_all(None, "g", &mut responses).await;
        assert_eq!(cache.physical_addr(&addr(2)).as_deref(), Some("10.0.0.2:7800"));
        assert_eq!(cache.logical_name(&addr(2)).as_deref(), Some("b"));
    }
}
