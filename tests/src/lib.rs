//! # Bucket-Ping Test Suite
//!
//! Scenarios that span more than one crate.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── flows.rs       # several registries sharing one store
//! │   └── runtime.rs     # config -> backend table -> heartbeat
//! └── benches/
//!     └── discovery_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bp-tests
//! cargo test -p bp-tests integration::runtime
//!
//! # Benchmarks
//! cargo bench -p bp-tests
//! ```

pub mod integration;
