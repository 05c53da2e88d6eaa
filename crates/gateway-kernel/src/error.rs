//! Crate-level error types for `gateway-kernel`.
//!
//! Provides a unified [`KernelError`] that composes errors from the
//! config-loading and gateway sub-modules together with
//! [`error_stack::Report`] for rich, context-carrying error propagation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gateway_kernel::error::{KernelError, KernelResult};
//! use error_stack::ResultExt;
//!
//! fn load_gateway_config() -> KernelResult<()> {
//!     let config = std::fs::read_to_string("gateway.toml")
//!         .map_err(KernelError::from)
//!         .map_err(error_stack::Report::new)
//!         .attach("loading gateway.toml")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Crate-level error type for `gateway-kernel`.
///
/// Wraps each sub-module's typed error via `#[from]` so that the `?`
/// operator converts them automatically. Use
/// [`error_stack::Report<KernelError>`] (via [`KernelResult`]) to attach
/// human-readable context as the error propagates up the call stack.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// A configuration-related error (requires the `config` feature).
    #[cfg(feature = "config")]
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// An error raised while validating or building gateway entities.
    #[error("Gateway error: {0}")]
    Gateway(#[from] crate::gateway::error::GatewayError),

    /// A low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal / untyped error described by a message string.
    #[error("{0}")]
    Internal(String),
}

/// Convenience result alias using [`error_stack::Report`].
///
/// Equivalent to `Result<T, error_stack::Report<KernelError>>`.
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::{Report, ResultExt};

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let kernel_err: KernelError = io_err.into();

        assert!(matches!(kernel_err, KernelError::Io(_)));
        assert!(kernel_err.to_string().contains("file missing"));
    }

    #[test]
    fn serde_error_converts_via_from() {
        let bad_json = serde_json::from_str::<serde_json::Value>("not json");
        let serde_err = bad_json.unwrap_err();
        let kernel_err: KernelError = serde_err.into();

        assert!(matches!(kernel_err, KernelError::Serialization(_)));
    }

    #[test]
    fn internal_error_display() {
        let err = KernelError::Internal("something broke".into());
        assert_eq!(err.to_string(), "something broke");
    }

    #[test]
    fn report_carries_context() {
        let result: KernelResult<()> = Err(Report::new(KernelError::Internal("root cause".into())))
            .attach("while loading gateway config");

        let report = result.unwrap_err();
        let display = format!("{report:?}");

        assert!(display.contains("root cause"));
        assert!(display.contains("while loading gateway config"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn config_error_converts_via_from() {
        let cfg_err = crate::config::ConfigError::UnsupportedFormat("xml".to_string());
        let kernel_err: KernelError = cfg_err.into();

        assert!(matches!(kernel_err, KernelError::Config(_)));
        assert!(kernel_err.to_string().contains("xml"));
    }
}
