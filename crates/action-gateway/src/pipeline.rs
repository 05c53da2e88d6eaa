//! Filter pipeline runner.
//!
//! Holds a set of [`GatewayFilter`] trait objects and runs them in
//! [`FilterOrder`] order. The web action gateway only slots the Export/Auth
//! Gate and the Throttle Checker into this pipeline — Identity and Entity
//! Lookup run directly in [`crate::handler`] since they need store handles
//! the generic filter interface doesn't carry.

use gateway_kernel::gateway::{FilterAction, GatewayContext, GatewayFilter, GatewayResponse};
use std::sync::Arc;

pub struct FilterPipeline {
    filters: Vec<Arc<dyn GatewayFilter>>,
}

impl FilterPipeline {
    pub fn new(mut filters: Vec<Arc<dyn GatewayFilter>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    /// Run every filter's `on_request` in ascending order, short-circuiting
    /// on the first non-`Continue` result.
    pub async fn run_request(&self, ctx: &mut GatewayContext) -> Result<FilterAction, gateway_kernel::gateway::GatewayError> {
        for filter in &self.filters {
            match filter.on_request(ctx).await? {
                FilterAction::Continue => continue,
                other => return Ok(other),
            }
        }
        Ok(FilterAction::Continue)
    }

    /// Run every filter's `on_response` in descending order (§4.8's response
    /// path mirrors the request path in reverse).
    pub async fn run_response(
        &self,
        ctx: &GatewayContext,
        resp: &mut GatewayResponse,
    ) -> Result<(), gateway_kernel::gateway::GatewayError> {
        for filter in self.filters.iter().rev() {
            filter.on_response(ctx, resp).await?;
        }
        Ok(())
    }
}
