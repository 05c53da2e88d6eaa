//! Export & Auth Gate (§4.3), implemented as a [`GatewayFilter`] slotted at
//! [`FilterOrder::EXPORT_GATE`].
//!
//! Runs after Identity and Entity Lookup have populated
//! `ctx.owner_identity`/`ctx.action` on the shared context; truth table:
//!
//! | `web-export` | `require-whisk-auth` | authenticated | Result |
//! |---|---|---|---|
//! | false | — | — | 404 |
//! | true | false | — | pass |
//! | true | true | true | pass |
//! | true | true | false | 401 |

use async_trait::async_trait;
use gateway_kernel::gateway::{FilterAction, FilterOrder, GatewayContext, GatewayError, GatewayFilter, GatewayResponse};

pub struct ExportGateFilter;

#[async_trait]
impl GatewayFilter for ExportGateFilter {
    fn name(&self) -> &str {
        "export-auth-gate"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::EXPORT_GATE
    }

    async fn on_request(&self, ctx: &mut GatewayContext) -> Result<FilterAction, GatewayError> {
        let Some(action) = &ctx.action else {
            return Ok(FilterAction::Reject(404, "action not found".to_string()));
        };

        if !action.is_web_exported() {
            return Ok(FilterAction::Reject(404, "action not exported".to_string()));
        }

        if action.requires_auth() && ctx.caller_identity.is_none() {
            return Ok(FilterAction::Reject(401, "authentication required".to_string()));
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
    use gateway_kernel::gateway::{Action, AuthKey, GatewayRequest, HttpMethod, Identity};

    fn ctx_with_action(action: gateway_kernel::gateway::Action) -> GatewayContext {
        let mut ctx = GatewayContext::new(GatewayRequest::new("req-1", "/", HttpMethod::Get));
        ctx.action = Some(action);
        ctx
    }

    fn identity() -> Identity {
        Identity::new(
            "guest",
            "guest-subject",
            AuthKey {
                uuid: "u".to_string(),
                secret: "s".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn unexported_action_is_rejected_with_404() {
        let action = Action::new("guest", "default", "hello");
        let mut ctx = ctx_with_action(action);
        let result = ExportGateFilter.on_request(&mut ctx).await.unwrap();
        assert_eq!(result, FilterAction::Reject(404, "action not exported".to_string()));
    }

    #[tokio::test]
    async fn exported_action_without_auth_requirement_passes() {
        let mut action = Action::new("guest", "default", "hello");
        action.annotations.insert("web-export".to_string(), serde_json::json!(true));
        let mut ctx = ctx_with_action(action);
        let result = ExportGateFilter.on_request(&mut ctx).await.unwrap();
        assert_eq!(result, FilterAction::Continue);
    }

    #[tokio::test]
    async fn exported_action_requiring_auth_passes_when_authenticated() {
        let mut action = Action::new("guest", "default", "hello");
        action.annotations.insert("web-export".to_string(), serde_json::json!(true));
        action.annotations.insert("require-whisk-auth".to_string(), serde_json::json!(true));
        let mut ctx = ctx_with_action(action);
        ctx.caller_identity = Some(identity());
        let result = ExportGateFilter.on_request(&mut ctx).await.unwrap();
        assert_eq!(result, FilterAction::Continue);
    }

    #[tokio::test]
    async fn exported_action_requiring_auth_rejects_anonymous_caller() {
        let mut action = Action::new("guest", "default", "hello");
        action.annotations.insert("web-export".to_string(), serde_json::json!(true));
        action.annotations.insert("require-whisk-auth".to_string(), serde_json::json!(true));
        let mut ctx = ctx_with_action(action);
        let result = ExportGateFilter.on_request(&mut ctx).await.unwrap();
        assert_eq!(result, FilterAction::Reject(401, "authentication required".to_string()));
    }

    #[tokio::test]
    async fn missing_action_in_context_is_rejected_with_404() {
        let mut ctx = GatewayContext::new(GatewayRequest::new("req-1", "/", HttpMethod::Get));
        let result = ExportGateFilter.on_request(&mut ctx).await.unwrap();
        assert_eq!(result, FilterAction::Reject(404, "action not found".to_string()));
    }
}
