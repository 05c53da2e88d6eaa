//! Runtime configuration for the action-gateway binary.
//!
//! Layered like the teacher's original entry point: sensible defaults,
//! optionally overridden by an on-disk config file (any format
//! `gateway_kernel::config` understands), further overridden by
//! `GATEWAY__`-prefixed environment variables.

use gateway_kernel::gateway::{GatewayConfig, ThrottleConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub api_prefix: String,
    /// Whether the experimental (`__ow_meta_`-prefixed) route is mounted
    /// alongside the main one. The experimental route always enforces
    /// `enforceExtension = true` regardless of `enforce_extension` below
    /// (§6) — that part is not configurable.
    pub experimental_enabled: bool,
    pub experimental_api_prefix: String,
    pub default_namespace: String,
    pub enforce_extension: bool,
    pub max_blocking_wait_ms: u64,
    pub entity_size_limit_bytes: usize,
    pub throttle_max_activations: u32,
    pub throttle_window_ms: u64,
}

impl Default for GatewayServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            api_prefix: "/api/v1/web".to_string(),
            experimental_enabled: true,
            experimental_api_prefix: "/experimental/web".to_string(),
            default_namespace: "guest".to_string(),
            enforce_extension: false,
            max_blocking_wait_ms: 60_000,
            entity_size_limit_bytes: 1024 * 1024,
            throttle_max_activations: 100,
            throttle_window_ms: 60_000,
        }
    }
}

impl GatewayServerConfig {
    /// Load configuration: start from defaults, merge an optional config
    /// file named by `GATEWAY_CONFIG_FILE`, then apply `GATEWAY__`-prefixed
    /// environment variable overrides.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("GATEWAY_CONFIG_FILE") {
            match gateway_kernel::config::load_config::<Self>(&path) {
                Ok(from_file) => config = from_file,
                Err(e) => tracing::warn!(error = %e, path = %path, "failed to load gateway config file, using defaults"),
            }
        }

        if let Ok(v) = std::env::var("GATEWAY__BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Ok(v) = std::env::var("GATEWAY__PORT") {
            if let Ok(v) = v.parse() {
                config.port = v;
            }
        }
        if let Ok(v) = std::env::var("GATEWAY__DEFAULT_NAMESPACE") {
            config.default_namespace = v;
        }
        if let Ok(v) = std::env::var("GATEWAY__ENFORCE_EXTENSION") {
            if let Ok(v) = v.parse() {
                config.enforce_extension = v;
            }
        }
        if let Ok(v) = std::env::var("GATEWAY__MAX_BLOCKING_WAIT_MS") {
            if let Ok(v) = v.parse() {
                config.max_blocking_wait_ms = v;
            }
        }

        config
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Project this runtime config into the kernel's structural
    /// [`GatewayConfig`] and run its validation.
    pub fn to_kernel_config(&self) -> Result<GatewayConfig, gateway_kernel::gateway::GatewayError> {
        let config = GatewayConfig::new("action-gateway")
            .with_default_namespace(self.default_namespace.clone())
            .with_max_blocking_wait_ms(self.max_blocking_wait_ms)
            .with_entity_size_limit_bytes(self.entity_size_limit_bytes as u64)
            .with_enforce_extension(self.enforce_extension)
            .with_throttle(ThrottleConfig::new(self.throttle_max_activations, self.throttle_window_ms));
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_a_valid_kernel_config() {
        let config = GatewayServerConfig::default();
        assert!(config.to_kernel_config().is_ok());
    }

    #[test]
    fn socket_addr_combines_bind_addr_and_port() {
        let config = GatewayServerConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }
}
