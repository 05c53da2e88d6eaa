//! Gateway configuration container and compile-time validation.
//!
//! [`GatewayConfig`] aggregates the structural settings of a web action
//! gateway instance — default namespace, blocking-wait bound, entity size
//! limit, throttle window — and exposes a single [`validate()`] method that
//! checks all structural invariants *before* any runtime resources are
//! allocated.

use super::error::GatewayError;
use super::filter::FilterChainConfig;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// ThrottleConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-window throttle parameters applied per action-owner identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Maximum activations an owner may start within `window_ms`.
    pub max_activations: u32,
    /// Window duration in milliseconds.
    pub window_ms: u64,
}

impl ThrottleConfig {
    pub fn new(max_activations: u32, window_ms: u64) -> Self {
        Self { max_activations, window_ms }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    fn validate(&self) -> Result<(), GatewayError> {
        if self.window_ms == 0 {
            return Err(GatewayError::InvalidThrottleWindow);
        }
        Ok(())
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { max_activations: 100, window_ms: 60_000 }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level gateway configuration.
///
/// Call [`validate()`](Self::validate) to check all structural invariants
/// before passing this config to the gateway runtime.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Unique identifier for this gateway instance.
    pub id: String,
    /// Namespace used for lookups that omit an explicit namespace segment.
    pub default_namespace: String,
    /// `maxBlockingWait` — the bound on the blocking invocation, in
    /// milliseconds. Must be > 0.
    pub max_blocking_wait_ms: u64,
    /// Maximum decoded request body size in bytes. Must be > 0.
    pub entity_size_limit_bytes: u64,
    /// Whether the route requires a recognized extension (406 otherwise) or
    /// falls back to `.http` when none is present. `true` for the
    /// experimental variant, `false` for the main variant.
    pub enforce_extension: bool,
    /// Optional filter chain configuration (Identity / Export Gate /
    /// Throttle / … in execution order).
    pub filter_chain: Option<FilterChainConfig>,
    /// Per-owner throttle configuration.
    pub throttle: ThrottleConfig,
}

impl GatewayConfig {
    /// Construct a minimal config with only a gateway id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_namespace: "guest".to_string(),
            max_blocking_wait_ms: 60_000,
            entity_size_limit_bytes: 1024 * 1024,
            enforce_extension: false,
            filter_chain: None,
            throttle: ThrottleConfig::default(),
        }
    }

    /// Builder: set the default namespace.
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Builder: set the blocking-wait bound.
    pub fn with_max_blocking_wait_ms(mut self, ms: u64) -> Self {
        self.max_blocking_wait_ms = ms;
        self
    }

    /// Builder: set the entity size limit.
    pub fn with_entity_size_limit_bytes(mut self, bytes: u64) -> Self {
        self.entity_size_limit_bytes = bytes;
        self
    }

    /// Builder: set whether an unrecognized/missing extension is a hard
    /// failure (`true`, experimental variant) or falls back to `.http`
    /// (`false`, main variant).
    pub fn with_enforce_extension(mut self, enforce: bool) -> Self {
        self.enforce_extension = enforce;
        self
    }

    /// Builder: set the filter chain.
    pub fn with_filter_chain(mut self, chain: FilterChainConfig) -> Self {
        self.filter_chain = Some(chain);
        self
    }

    /// Builder: set the throttle config.
    pub fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate all structural invariants of this configuration.
    ///
    /// Checks performed (in order):
    /// 1. Gateway id is non-empty.
    /// 2. Default namespace is non-empty.
    /// 3. `max_blocking_wait_ms` is non-zero.
    /// 4. `entity_size_limit_bytes` is non-zero.
    /// 5. If a filter chain is present, it is non-empty.
    /// 6. Throttle window is non-zero.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.id.trim().is_empty() {
            return Err(GatewayError::EmptyGatewayId);
        }
        if self.default_namespace.trim().is_empty() {
            return Err(GatewayError::EmptyDefaultNamespace);
        }
        if self.max_blocking_wait_ms == 0 {
            return Err(GatewayError::InvalidTimeout);
        }
        if self.entity_size_limit_bytes == 0 {
            return Err(GatewayError::InvalidEntitySizeLimit);
        }
        if self
            .filter_chain
            .as_ref()
            .is_some_and(|chain| chain.filter_names.is_empty())
        {
            return Err(GatewayError::EmptyFilterChain);
        }
        self.throttle.validate()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::filter::FilterChainConfig;

    fn valid_config() -> GatewayConfig {
        GatewayConfig::new("action-gateway")
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn valid_config_with_filter_chain_passes() {
        let chain = FilterChainConfig::new(
            "default",
            vec!["identity".to_string(), "export-gate".to_string(), "throttle".to_string()],
        );
        let cfg = valid_config().with_filter_chain(chain);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_gateway_id_returns_error() {
        let cfg = GatewayConfig::new("");
        assert_eq!(cfg.validate(), Err(GatewayError::EmptyGatewayId));
    }

    #[test]
    fn whitespace_only_gateway_id_returns_error() {
        let cfg = GatewayConfig::new("   ");
        assert_eq!(cfg.validate(), Err(GatewayError::EmptyGatewayId));
    }

    #[test]
    fn empty_default_namespace_returns_error() {
        let cfg = valid_config().with_default_namespace("");
        assert_eq!(cfg.validate(), Err(GatewayError::EmptyDefaultNamespace));
    }

    #[test]
    fn zero_blocking_wait_returns_error() {
        let cfg = valid_config().with_max_blocking_wait_ms(0);
        assert_eq!(cfg.validate(), Err(GatewayError::InvalidTimeout));
    }

    #[test]
    fn zero_entity_size_limit_returns_error() {
        let cfg = valid_config().with_entity_size_limit_bytes(0);
        assert_eq!(cfg.validate(), Err(GatewayError::InvalidEntitySizeLimit));
    }

    #[test]
    fn empty_filter_chain_returns_error() {
        let chain = FilterChainConfig::new("default", vec![]);
        let cfg = valid_config().with_filter_chain(chain);
        assert_eq!(cfg.validate(), Err(GatewayError::EmptyFilterChain));
    }

    #[test]
    fn zero_throttle_window_returns_error() {
        let cfg = valid_config().with_throttle(ThrottleConfig::new(100, 0));
        assert_eq!(cfg.validate(), Err(GatewayError::InvalidThrottleWindow));
    }
}
