//! Throttle Checker (§4.4), implemented as a [`GatewayFilter`] slotted at
//! [`FilterOrder::THROTTLE`].
//!
//! Fixed-window rate limiting keyed by the **action-owner identity's**
//! namespace, not the caller — an anonymous request is throttled against the
//! same counter as an authenticated one, because the owner's quota is what's
//! being spent either way (§4.4).

use dashmap::DashMap;
use gateway_kernel::gateway::{FilterAction, FilterOrder, GatewayContext, GatewayError, GatewayFilter, GatewayResponse, ThrottleConfig};
use std::time::Instant;

struct WindowState {
    count: u32,
    window_start: Instant,
}

pub struct ThrottleFilter {
    config: ThrottleConfig,
    windows: DashMap<String, WindowState>,
}

impl ThrottleFilter {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Returns `true` if the owner's current window has spent its quota.
    fn is_throttled(&self, owner_namespace: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(owner_namespace.to_string()).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window() {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count > self.config.max_activations
    }
}

#[async_trait::async_trait]
impl GatewayFilter for ThrottleFilter {
    fn name(&self) -> &str {
        "throttle-checker"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::THROTTLE
    }

    async fn on_request(&self, ctx: &mut GatewayContext) -> Result<FilterAction, GatewayError> {
        let Some(owner) = &ctx.owner_identity else {
            return Ok(FilterAction::Reject(404, "owner identity not resolved".to_string()));
        };

        if self.is_throttled(&owner.namespace) {
            return Ok(FilterAction::Reject(429, "activation quota exceeded".to_string()));
        }

        Ok(FilterAction::Continue)
    }

    async fn on_response(&self, _ctx: &GatewayContext, _resp: &mut GatewayResponse) -> Result<(), GatewayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_kernel::gateway::{AuthKey, GatewayRequest, HttpMethod, Identity};

    fn ctx_with_owner(namespace: &str) -> GatewayContext {
        let mut ctx = GatewayContext::new(GatewayRequest::new("req-1", "/", HttpMethod::Get));
        ctx.owner_identity = Some(Identity::new(
            namespace,
            "subject",
            AuthKey {
                uuid: "u".to_string(),
                secret: "s".to_string(),
            },
        ));
        ctx
    }

    #[tokio::test]
    async fn requests_within_quota_pass() {
        let filter = ThrottleFilter::new(ThrottleConfig::new(2, 60_000));
        let mut ctx = ctx_with_owner("guest");
        assert_eq!(filter.on_request(&mut ctx).await.unwrap(), FilterAction::Continue);
        assert_eq!(filter.on_request(&mut ctx).await.unwrap(), FilterAction::Continue);
    }

    #[tokio::test]
    async fn request_exceeding_quota_is_throttled() {
        let filter = ThrottleFilter::new(ThrottleConfig::new(1, 60_000));
        let mut ctx = ctx_with_owner("guest");
        assert_eq!(filter.on_request(&mut ctx).await.unwrap(), FilterAction::Continue);
        assert_eq!(
            filter.on_request(&mut ctx).await.unwrap(),
            FilterAction::Reject(429, "activation quota exceeded".to_string())
        );
    }

    #[tokio::test]
    async fn separate_owners_have_independent_quotas() {
        let filter = ThrottleFilter::new(ThrottleConfig::new(1, 60_000));
        let mut ctx_a = ctx_with_owner("alice");
        let mut ctx_b = ctx_with_owner("bob");
        assert_eq!(filter.on_request(&mut ctx_a).await.unwrap(), FilterAction::Continue);
        assert_eq!(filter.on_request(&mut ctx_b).await.unwrap(), FilterAction::Continue);
    }

    #[tokio::test]
    async fn missing_owner_identity_is_rejected() {
        let filter = ThrottleFilter::new(ThrottleConfig::new(1, 60_000));
        let mut ctx = GatewayContext::new(GatewayRequest::new("req-1", "/", HttpMethod::Get));
        let result = filter.on_request(&mut ctx).await.unwrap();
        assert_eq!(result, FilterAction::Reject(404, "owner identity not resolved".to_string()));
    }
}
