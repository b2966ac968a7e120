//! # Bucket Telemetry
//!
//! Logging and metrics for Bucket-Ping processes.
//!
//! - **Logging:** `tracing-subscriber` with an `EnvFilter`, plain or JSON
//! - **Metrics:** Prometheus counters and gauges behind the
//!   [`DiscoveryMetrics`](bucket_discovery::DiscoveryMetrics) port
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bucket_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let metrics = init_telemetry(&TelemetryConfig::from_env())?;
//! let registry = registry.with_metrics(metrics);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BP_SERVICE_NAME` | `bucket-ping` | Service name attached to startup logs |
//! | `BP_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `BP_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `BP_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    error_kind, gather_text, register_metrics, PrometheusDiscoveryMetrics, CACHED_PEERS,
    ERRORS, LAST_ROUND_DELIVERED, OPERATIONS, RECORDS_DELIVERED, REGISTRY,
};

use std::sync::Arc;
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register metrics.
///
/// Returns the metrics sink to hand to the registry.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<Arc<PrometheusDiscoveryMetrics>, TelemetryError> {
    init_logging(config)?;
    let metrics = PrometheusDiscoveryMetrics::new()?;
    tracing::info!(service = %config.service_name, "telemetry initialized");
    Ok(Arc::new(metrics))
}
