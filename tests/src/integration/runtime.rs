//! # Runtime Scenarios
//!
//! The path the `bucket-ping` binary takes: TOML config, backend table,
//! registry, heartbeat.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::watch;

    use bucket_discovery::{DiscoveryBackend, NoOpMetrics, NodeAddress, Responses};
    use bucket_telemetry::{gather_text, PrometheusDiscoveryMetrics};
    use ping_runtime::{
        assemble_registry, build_registry, local_record, open_store, Heartbeat, RuntimeConfig,
    };

    fn file_config(root: &std::path::Path, name: &str, port: u16) -> RuntimeConfig {
        let toml = format!(
            r#"
            [registry]
            group = "cluster"
            prefix = "jgroups"

            [store]
            backend = "file"

            [store.file]
            root = "{}"

            [heartbeat]
            interval_secs = 1

            [node]
            name = "{}"
            physical_addr = "127.0.0.1:{}"
            "#,
            root.display(),
            name,
            port
        );
        let config = RuntimeConfig::parse(&toml).unwrap();
        config.validate().unwrap();
        config
    }

    async fn heartbeat_for(config: &RuntimeConfig) -> Heartbeat {
        let local = local_record(config).unwrap();
        let registry = build_registry(config, local.address, Arc::new(NoOpMetrics))
            .await
            .unwrap();
        Heartbeat::new(
            Arc::new(registry),
            config.registry.group.clone(),
            local,
            Duration::from_millis(20),
        )
    }

    /// Two processes' worth of runtime over one shared directory agree on
    /// membership and on the coordinator.
    #[tokio::test]
    async fn test_two_nodes_agree_on_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = heartbeat_for(&file_config(dir.path(), "a", 7800)).await;
        let mut b = heartbeat_for(&file_config(dir.path(), "b", 7801)).await;

        a.beat().await;
        b.beat().await;
        let view_a = a.beat().await;
        let view_b = b.beat().await;

        assert_eq!(view_a.size(), 2);
        assert_eq!(view_a.coordinator, view_b.coordinator);
        assert_ne!(a.local().is_coordinator, b.local().is_coordinator);
    }

    #[tokio::test]
    async fn test_shutdown_leaves_the_group() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path(), "a", 7800);
        let hb = heartbeat_for(&config).await;
        let me = hb.local().address;
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(hb.run(rx));
        tokio::time::sleep(Duration::from_millis(80)).await;

        let observer = build_registry(&config, NodeAddress::random(), Arc::new(NoOpMetrics))
            .await
            .unwrap();
        let mut before = Responses::new();
        observer.read_all(None, "cluster", &mut before).await;
        assert!(before.contains(&me));

        tx.send(true).unwrap();
        handle.await.unwrap();

        let mut after = Responses::new();
        observer.read_all(None, "cluster", &mut after).await;
        assert!(after.is_empty());
    }

    /// The memory backend is process local, so nodes must share one store.
    #[tokio::test]
    async fn test_memory_backend_shared_store() {
        let mut config = RuntimeConfig::parse("[store]\nbackend = \"memory\"").unwrap();
        config.store.memory.page_size = Some(1);
        config.validate().unwrap();

        let store = open_store(&config).await.unwrap();
        let mut nodes = Vec::new();
        for _ in 0..3 {
            let local = local_record(&config).unwrap();
            let registry =
                assemble_registry(store.clone(), &config, local.address, Arc::new(NoOpMetrics))
                    .unwrap();
            nodes.push(Heartbeat::new(
                Arc::new(registry),
                "g",
                local,
                Duration::from_secs(1),
            ));
        }

        for node in nodes.iter_mut() {
            node.beat().await;
        }
        let mut views = Vec::new();
        for node in nodes.iter_mut() {
            views.push(node.beat().await);
        }

        let coordinators = nodes.iter().filter(|n| n.local().is_coordinator).count();
        assert_eq!(coordinators, 1);
        assert!(views.iter().all(|v| v.size() == 3));
    }

    /// What `--print-metrics` prints reflects the operations just run.
    #[tokio::test]
    async fn test_metrics_text_after_discover() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path(), "a", 7800);
        let metrics = Arc::new(PrometheusDiscoveryMetrics::new().unwrap());
        let registry = build_registry(&config, NodeAddress::random(), metrics)
            .await
            .unwrap();

        let mut responses = Responses::new();
        registry.read_all(None, "cluster", &mut responses).await;

        let text = gather_text().unwrap();
        assert!(text.contains("bp_discovery_operations_total"));
        assert!(text.contains(r#"operation="read_all""#));
    }

    #[tokio::test]
    async fn test_fixed_node_address_from_config() {
        let me = NodeAddress::random();
        let config = RuntimeConfig::parse(&format!(
            "[store]\nbackend = \"memory\"\n[node]\naddress = \"{}\"",
            me
        ))
        .unwrap();

        assert_eq!(local_record(&config).unwrap().address, me);
    }
}
