//! # Ping Runtime
//!
//! Everything the `bucket-ping` binary needs besides argument parsing:
//!
//! - [`config`]: TOML configuration with `BP_*` environment overrides
//! - [`backends`]: the static backend table (`s3`, `file`, `memory`)
//! - [`heartbeat`]: the periodic publish/read loop and view computation

pub mod backends;
pub mod config;
pub mod heartbeat;

pub use backends::{
    assemble_registry, backend_names, build_registry, lookup, open_store, BackendCtor,
    BackendError, BACKENDS,
};
pub use config::{ConfigError, RuntimeConfig};
pub use heartbeat::{Heartbeat, View};

use bucket_discovery::{NodeAddress, PeerRecord};

/// The local node's advertisement as configured under `[node]`.
pub fn local_record(config: &RuntimeConfig) -> Result<PeerRecord, ConfigError> {
    let address = config.node_address()?.unwrap_or_else(NodeAddress::random);
    Ok(PeerRecord::new(
        address,
        config.node.name.clone(),
        config.node.physical_addr.clone(),
    ))
}
