//! Framework-level web action gateway contract.
//!
//! This module defines the *trait interfaces, data model, and
//! configuration-time validation* for the web action gateway. No concrete
//! stores, no axum, no network I/O live here — those belong in
//! `action-gateway` (runtime).
//!
//! # Architecture mapping
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              gateway-kernel  (this module)                  │
//! │  IdentityStore / EntityStore traits  GatewayConfig + validate() │
//! │  GatewayFilter trait    Identity/Package/Action/Activation   │
//! │  GatewayRequest/Response/Context  MediaExtension  GatewayError │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │  depends on
//! ┌──────────────────────────▼──────────────────────────────────┐
//! │              action-gateway  (runtime crate)                │
//! │  InMemoryIdentityStore / InMemoryEntityStore                 │
//! │  ExportGateFilter / ThrottleFilter                           │
//! │  Request Decoder, parameter merge, transcoder                │
//! │  GatewayServer  (axum HTTP server)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use gateway_kernel::gateway::{GatewayConfig, ThrottleConfig};
//!
//! let config = GatewayConfig::new("web-action-gateway")
//!     .with_default_namespace("guest")
//!     .with_max_blocking_wait_ms(60_000)
//!     .with_throttle(ThrottleConfig::new(100, 60_000));
//!
//! config.validate().expect("gateway config is valid");
//! ```

pub mod error;
pub mod filter;
pub mod model;
pub mod registry;
pub mod validation;

// ── Flat re-exports ────────────────────────────────────────────────────────

pub use error::GatewayError;
pub use filter::{FilterAction, FilterChainConfig, FilterOrder, GatewayFilter};
pub use model::{
    Action, Activation, ActivationStatus, AuthKey, Identity, InvocationContext, MediaExtension,
    Package, ANNOTATION_FINAL, ANNOTATION_RAW_HTTP, ANNOTATION_REQUIRE_WHISK_AUTH,
    ANNOTATION_WEB_EXPORT, DEFAULT_PACKAGE, ERROR_FIELD,
};
pub use registry::{EntityStore, IdentityStore};
pub use validation::{GatewayConfig, ThrottleConfig};

// types module is pub so implementors in action-gateway can use the structs
pub mod types;
pub use types::{GatewayContext, GatewayRequest, GatewayResponse, HttpMethod, RouteMatch};
