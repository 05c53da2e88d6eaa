//! Ambient request logging, slotted at [`FilterOrder::LOGGING`].
//!
//! Every request gets one structured log line per stage transition; this
//! filter only covers the chain's own request/response boundary. The
//! top-level handler logs its own transaction id separately on error paths
//! (see [`crate::error::GatewayError`]).

use async_trait::async_trait;
use gateway_kernel::gateway::{FilterAction, FilterOrder, GatewayContext, GatewayError, GatewayFilter, GatewayResponse};

pub struct LoggingFilter;

#[async_trait]
impl GatewayFilter for LoggingFilter {
    fn name(&self) -> &str {
        "request-logger"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::LOGGING
    }

    async fn on_request(&self, ctx: &mut GatewayContext) -> Result<FilterAction, GatewayError> {
        tracing::info!(
            request_id = %ctx.request.id,
            method = ctx.request.method.as_str(),
            path = %ctx.request.path,
            "web action request received"
        );
        Ok(FilterAction::Continue)
    }

    async fn on_response(&self, ctx: &GatewayContext, resp: &mut GatewayResponse) -> Result<(), GatewayError> {
        tracing::info!(
            request_id = %ctx.request.id,
            status = resp.status,
            latency_ms = resp.latency_ms,
            "web action request completed"
        );
        Ok(())
    }
}
