//! HTTP runtime for the web action gateway.
//!
//! This crate implements every concrete piece `gateway-kernel` only
//! specifies as a trait or data type: in-memory identity/entity stores, the
//! request decoder, parameter merge, the export/throttle filters, a mock
//! invoker, the response transcoder, and the axum server that ties them
//! together.

pub mod config;
pub mod decode;
pub mod error;
pub mod gate;
pub mod handler;
pub mod invoke;
pub mod logging;
pub mod media;
pub mod merge;
pub mod pipeline;
pub mod server;
pub mod stores;
pub mod throttle;
pub mod transcode;

pub use config::GatewayServerConfig;
pub use error::{GatewayError, GatewayResult};
pub use server::GatewayServer;
