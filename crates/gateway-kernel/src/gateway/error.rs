//! Gateway error types for `gateway-kernel`.
//!
//! [`GatewayError`] covers every failure mode that can be detected at
//! *definition time* — an empty gateway id, a malformed media-extension
//! table, a nonsensical throttle configuration — before any request has been
//! decoded. Runtime failures (missing entity, throttled caller, malformed
//! projection, …) belong in the gateway implementation crate
//! (`action-gateway`).

use thiserror::Error;

/// Compile-time / configuration error type for the gateway kernel contract.
///
/// All variants are `#[non_exhaustive]` at the enum level so future releases
/// can add new failure modes without breaking existing `match` arms.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    /// The gateway configuration `id` field is empty or whitespace-only.
    #[error("gateway id cannot be empty")]
    EmptyGatewayId,

    /// The default namespace used for unscoped lookups is empty.
    #[error("default namespace cannot be empty")]
    EmptyDefaultNamespace,

    /// `maxBlockingWait` (or the global request timeout) is zero, which would
    /// reject every blocking invocation immediately.
    #[error("request timeout must be greater than 0 ms")]
    InvalidTimeout,

    /// The entity size limit applied to decoded request bodies is zero.
    #[error("entity size limit must be greater than 0 bytes")]
    InvalidEntitySizeLimit,

    /// The throttle window duration is zero.
    #[error("throttle window must be greater than 0 ms")]
    InvalidThrottleWindow,

    /// A filter chain is empty (must contain at least one filter).
    #[error("filter chain must contain at least one filter")]
    EmptyFilterChain,

    /// The media-extension table is missing one of the five recognized
    /// extensions (`.http`, `.json`, `.html`, `.svg`, `.text`).
    #[error("media extension table is missing required extension: {0}")]
    MissingMediaExtension(String),
}
