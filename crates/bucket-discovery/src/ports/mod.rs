//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** what the membership engine calls
//!   ([`DiscoveryBackend`]) and how it receives results ([`ResponseSink`]).
//! - **Driven Ports (Outbound):** what the registry requires from adapters
//!   ([`ObjectStore`], [`RecordCodec`], [`DiscoveryMetrics`]).

pub mod inbound;
pub mod outbound;

pub use inbound::{DiscoveryBackend, ResponseSink};
pub use outbound::{
    DiscoveryMetrics, ListPage, NoOpMetrics, ObjectStore, ObjectSummary, OpOutcome, PutOptions,
    RecordCodec, RegistryOp,
};
