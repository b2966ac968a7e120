//! Prometheus metrics for the discovery registry.
//!
//! All metrics follow the naming convention: `bp_discovery_<metric>[_<unit>]`

use bucket_discovery::{
    CodecError, DiscoveryMetrics, OpOutcome, RegistryError, RegistryOp, StoreError,
};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Registry operations by outcome
    pub static ref OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("bp_discovery_operations_total", "Discovery registry operations"),
        &["operation", "outcome"]  // outcome: success/partial/failure
    ).expect("metric creation failed");

    /// Absorbed errors by cause
    pub static ref ERRORS: CounterVec = CounterVec::new(
        Opts::new("bp_discovery_errors_total", "Errors absorbed by the discovery registry"),
        &["operation", "kind"]
    ).expect("metric creation failed");

    /// Records handed to the membership engine
    pub static ref RECORDS_DELIVERED: IntCounter = IntCounter::new(
        "bp_discovery_records_delivered_total",
        "Peer records delivered to the response sink"
    ).expect("metric creation failed");

    /// Records delivered by the most recent read round
    pub static ref LAST_ROUND_DELIVERED: IntGauge = IntGauge::new(
        "bp_discovery_last_round_records",
        "Peer records delivered by the most recent read round"
    ).expect("metric creation failed");

    /// Possible peers registered by the most recent read round
    pub static ref CACHED_PEERS: IntGauge = IntGauge::new(
        "bp_discovery_last_round_cached_peers",
        "Possible peers registered in the discovery cache by the most recent read round"
    ).expect("metric creation failed");

    /// Registration outcome, computed once.
    static ref REGISTERED: Result<(), String> = register_all();
}

fn register_all() -> Result<(), String> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(OPERATIONS.clone()),
        Box::new(ERRORS.clone()),
        Box::new(RECORDS_DELIVERED.clone()),
        Box::new(LAST_ROUND_DELIVERED.clone()),
        Box::new(CACHED_PEERS.clone()),
    ];

    for metric in metrics {
        REGISTRY.register(metric).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() -> Result<(), TelemetryError> {
    REGISTERED
        .clone()
        .map_err(TelemetryError::MetricsInit)
}

/// Encode all metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Stable label for an absorbed error.
pub fn error_kind(error: &RegistryError) -> &'static str {
    match error {
        RegistryError::Store(StoreError::NotFound { .. }) => "store_not_found",
        RegistryError::Store(StoreError::AccessDenied(_)) => "store_access_denied",
        RegistryError::Store(StoreError::Unavailable(_)) => "store_unavailable",
        RegistryError::Store(StoreError::Http { .. }) => "store_http",
        RegistryError::Store(StoreError::Protocol(_)) => "store_protocol",
        RegistryError::Store(StoreError::Io { .. }) => "store_io",
        RegistryError::Store(StoreError::Injected(_)) => "store_injected",
        RegistryError::Codec(CodecError::UnsupportedVersion(_)) => "codec_version",
        RegistryError::Codec(_) => "codec_malformed",
        RegistryError::Key(_) => "key",
    }
}

/// [`DiscoveryMetrics`] backed by the global Prometheus registry.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusDiscoveryMetrics {
    _private: (),
}

impl PrometheusDiscoveryMetrics {
    /// Register metrics (once per process) and return a sink.
    pub fn new() -> Result<Self, TelemetryError> {
        register_metrics()?;
        Ok(Self { _private: () })
    }
}

impl DiscoveryMetrics for PrometheusDiscoveryMetrics {
    fn record_operation(&self, op: RegistryOp, outcome: OpOutcome) {
        OPERATIONS
            .with_label_values(&[op.as_str(), outcome.as_str()])
            .inc();
    }

    fn record_error(&self, op: RegistryOp, error: &RegistryError) {
        ERRORS
            .with_label_values(&[op.as_str(), error_kind(error)])
            .inc();
    }

    fn record_read_round(&self, delivered: usize, cached: usize) {
        RECORDS_DELIVERED.inc_by(delivered as u64);
        LAST_ROUND_DELIVERED.set(delivered as i64);
        CACHED_PEERS.set(cached as i64);
    }
}
