//! Framework-level contract types for the web action gateway.
//!
//! `gateway-kernel` defines the pure, axum-free domain model and
//! configuration-time validation rules shared by the gateway runtime: the
//! action/package/identity data model, media-extension projection table,
//! filter-pipeline trait contracts, and the structural [`gateway::error::GatewayError`].
//! No network I/O and no request-time types live here — those belong in the
//! runtime crate (`action-gateway`).

// error module
pub mod error;

// Unified configuration loading (multi-format + env substitution)
pub mod config;

// gateway domain model, filter contracts, validation
pub mod gateway;
