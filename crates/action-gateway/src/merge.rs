//! Parameter Merge & Immutability Check (§4.5).
//!
//! Builds the final invocation payload from the package/action defaults, the
//! query string, the parsed body, and gateway-injected metadata — or, for
//! raw-http actions, the single-envelope shortcut that bypasses all of it.
//!
//! Both the main and experimental routes (§6) share this module; they differ
//! only in [`ApiVariant`]'s reserved-key names. Per §9's open question, the
//! experimental variant still gets its body decoded through [`crate::decode`]
//! the same way the main variant does — this module does not re-implement
//! the experimental API's historical direct form-field merge.

use crate::error::{GatewayError, GatewayResult};
use gateway_kernel::gateway::{Action, HttpMethod, InvocationContext};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Reserved payload keys for the main (non-experimental) web API, per §6.
pub const OW_METHOD: &str = "__ow_method";
pub const OW_HEADERS: &str = "__ow_headers";
pub const OW_PATH: &str = "__ow_path";
pub const OW_USER: &str = "__ow_user";
pub const OW_QUERY: &str = "__ow_query";
pub const OW_BODY: &str = "__ow_body";

/// Reserved payload keys for the experimental (`__ow_meta_` prefix) variant,
/// per §6. No query/body envelope keys exist here — the experimental
/// variant never supports the raw-http fast path.
pub const OW_META_VERB: &str = "__ow_meta_verb";
pub const OW_META_HEADERS: &str = "__ow_meta_headers";
pub const OW_META_PATH: &str = "__ow_meta_path";
pub const OW_META_NAMESPACE: &str = "__ow_meta_namespace";

/// Which of the two web-route flavors a request arrived on. Selects the
/// reserved-key names injected into the payload and whether `enforceExtension`
/// is forced (§6: the experimental route always enforces it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVariant {
    Main,
    Experimental,
}

impl ApiVariant {
    /// Whether the route forces `enforceExtension = true` regardless of
    /// gateway configuration.
    pub fn forces_enforce_extension(&self) -> bool {
        matches!(self, ApiVariant::Experimental)
    }

    fn reserved_properties(&self) -> HashSet<&'static str> {
        match self {
            ApiVariant::Main => [OW_METHOD, OW_HEADERS, OW_PATH, OW_USER, OW_QUERY, OW_BODY]
                .into_iter()
                .collect(),
            ApiVariant::Experimental => [OW_META_VERB, OW_META_HEADERS, OW_META_PATH, OW_META_NAMESPACE]
                .into_iter()
                .collect(),
        }
    }
}

/// Compute the set of query/body keys that collide with a reserved property
/// or an immutable action parameter. Non-empty means the request must be
/// rejected with 400 before invocation (§4.5).
fn offenders(
    query: &std::collections::HashMap<String, String>,
    body: Option<&Value>,
    action: &Action,
    variant: ApiVariant,
) -> HashSet<String> {
    let reserved = variant.reserved_properties();
    let mut candidates: HashSet<String> = query.keys().cloned().collect();
    if let Some(Value::Object(map)) = body {
        candidates.extend(map.keys().cloned());
    }
    candidates
        .into_iter()
        .filter(|k| reserved.contains(k.as_str()) || action.immutable_parameters.contains(k))
        .collect()
}

fn owner_namespace_for_injection(action: &Action) -> &str {
    &action.namespace
}

/// Build the final JSON payload to hand the invoker, applying the
/// precedence order `package.parameters → action.parameters → query → body →
/// injected metadata` (action parameters already carry merged package
/// defaults via [`Action::merge_package_defaults`]).
///
/// For raw-http actions on the main variant, the immutability check is
/// skipped and the query/body are collapsed into the `query`/`body`
/// reserved keys as a single opaque envelope (§4.5's "raw-http envelope").
/// The experimental variant has no raw-http envelope; a `raw-http` action
/// reached through it merges normally.
pub fn merge_parameters(action: &Action, ctx: &InvocationContext, variant: ApiVariant) -> GatewayResult<Value> {
    if variant == ApiVariant::Main && action.is_raw_http() {
        return Ok(build_raw_http_envelope(action, ctx));
    }

    if !offenders(&ctx.query, ctx.body.as_ref(), action, variant).is_empty() {
        return Err(GatewayError::BadInput("parameters not allowed".to_string()));
    }

    let mut payload = Map::new();
    for (k, v) in &action.parameters {
        payload.insert(k.clone(), v.clone());
    }
    for (k, v) in &ctx.query {
        payload.insert(k.clone(), Value::String(v.clone()));
    }
    if let Some(Value::Object(body_map)) = &ctx.body {
        for (k, v) in body_map {
            payload.insert(k.clone(), v.clone());
        }
    }

    inject_metadata(&mut payload, action, ctx, variant);
    Ok(Value::Object(payload))
}

fn build_raw_http_envelope(action: &Action, ctx: &InvocationContext) -> Value {
    let mut payload = Map::new();
    for (k, v) in &action.parameters {
        payload.insert(k.clone(), v.clone());
    }

    let raw_query = serde_urlencoded::to_string(&ctx.query).unwrap_or_default();
    payload.insert(OW_QUERY.to_string(), Value::String(raw_query));

    let raw_body = match &ctx.body {
        Some(v) => v.clone(),
        None => Value::String(String::new()),
    };
    payload.insert(OW_BODY.to_string(), raw_body);

    inject_metadata(&mut payload, action, ctx, ApiVariant::Main);
    Value::Object(payload)
}

fn inject_metadata(payload: &mut Map<String, Value>, action: &Action, ctx: &InvocationContext, variant: ApiVariant) {
    let headers_map: Map<String, Value> = ctx
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let namespace = owner_namespace_for_injection(action).to_string();

    match variant {
        ApiVariant::Main => {
            payload.insert(OW_METHOD.to_string(), Value::String(method_str(&ctx.method).to_string()));
            payload.insert(OW_HEADERS.to_string(), Value::Object(headers_map));
            payload.insert(OW_PATH.to_string(), Value::String(ctx.path.clone()));
            payload.insert(OW_USER.to_string(), Value::String(namespace));
        }
        ApiVariant::Experimental => {
            payload.insert(OW_META_VERB.to_string(), Value::String(method_str(&ctx.method).to_string()));
            payload.insert(OW_META_HEADERS.to_string(), Value::Object(headers_map));
            payload.insert(OW_META_PATH.to_string(), Value::String(ctx.path.clone()));
            payload.insert(OW_META_NAMESPACE.to_string(), Value::String(namespace));
        }
    }
}

fn method_str(method: &HttpMethod) -> &'static str {
    method.as_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_kernel::gateway::MediaExtension;
    use std::collections::HashMap;

    fn ctx_with(query: HashMap<String, String>, body: Option<Value>) -> InvocationContext {
        let mut ctx = InvocationContext::new(HttpMethod::Post, MediaExtension::Json);
        ctx.query = query;
        ctx.body = body;
        ctx
    }

    #[test]
    fn body_overrides_package_default_via_query_then_body() {
        let mut action = Action::new("guest", "pkg", "echo");
        action.parameters.insert("x".to_string(), serde_json::json!(0));

        let query: HashMap<String, String> = [("x".to_string(), "1".to_string())].into_iter().collect();
        let body = Some(serde_json::json!({"x": 2}));
        let ctx = ctx_with(query, body);

        let payload = merge_parameters(&action, &ctx, ApiVariant::Main).unwrap();
        assert_eq!(payload["x"], 2);
    }

    #[test]
    fn immutable_parameter_override_is_rejected() {
        let mut action = Action::new("guest", "pkg", "echo");
        action.immutable_parameters.insert("x".to_string());

        let body = Some(serde_json::json!({"x": 2}));
        let ctx = ctx_with(HashMap::new(), body);

        let err = merge_parameters(&action, &ctx, ApiVariant::Main).unwrap_err();
        assert!(matches!(err, GatewayError::BadInput(_)));
    }

    #[test]
    fn reserved_key_in_query_is_rejected() {
        let action = Action::new("guest", "pkg", "echo");
        let query: HashMap<String, String> = [(OW_METHOD.to_string(), "get".to_string())].into_iter().collect();
        let ctx = ctx_with(query, None);

        let err = merge_parameters(&action, &ctx, ApiVariant::Main).unwrap_err();
        assert!(matches!(err, GatewayError::BadInput(_)));
    }

    #[test]
    fn injected_metadata_present_in_payload() {
        let action = Action::new("guest", "pkg", "echo");
        let ctx = ctx_with(HashMap::new(), None);
        let payload = merge_parameters(&action, &ctx, ApiVariant::Main).unwrap();
        assert_eq!(payload[OW_METHOD], "post");
        assert_eq!(payload[OW_USER], "guest");
    }

    #[test]
    fn experimental_variant_injects_meta_prefixed_keys() {
        let action = Action::new("guest", "pkg", "echo");
        let ctx = ctx_with(HashMap::new(), None);
        let payload = merge_parameters(&action, &ctx, ApiVariant::Experimental).unwrap();
        assert_eq!(payload[OW_META_VERB], "post");
        assert_eq!(payload[OW_META_NAMESPACE], "guest");
        assert!(payload.get(OW_METHOD).is_none());
    }

    #[test]
    fn experimental_variant_reserved_key_collision_is_rejected() {
        let action = Action::new("guest", "pkg", "echo");
        let query: HashMap<String, String> = [(OW_META_VERB.to_string(), "x".to_string())].into_iter().collect();
        let ctx = ctx_with(query, None);
        let err = merge_parameters(&action, &ctx, ApiVariant::Experimental).unwrap_err();
        assert!(matches!(err, GatewayError::BadInput(_)));
    }

    #[test]
    fn experimental_variant_ignores_raw_http_envelope() {
        let mut action = Action::new("guest", "pkg", "raw");
        action.annotations.insert("raw-http".to_string(), Value::Bool(true));
        let ctx = ctx_with(HashMap::new(), Some(serde_json::json!({"a": 1})));

        let payload = merge_parameters(&action, &ctx, ApiVariant::Experimental).unwrap();
        assert_eq!(payload["a"], 1);
        assert!(payload.get(OW_BODY).is_none());
    }

    #[test]
    fn raw_http_action_skips_immutability_check() {
        let mut action = Action::new("guest", "pkg", "raw");
        action.annotations.insert("raw-http".to_string(), Value::Bool(true));
        action.immutable_parameters.insert("body".to_string());

        let query: HashMap<String, String> = [("a".to_string(), "1".to_string())].into_iter().collect();
        let body = Some(serde_json::json!("payload"));
        let ctx = ctx_with(query, body);

        let payload = merge_parameters(&action, &ctx, ApiVariant::Main).unwrap();
        assert_eq!(payload[OW_BODY], "payload");
        assert_eq!(payload[OW_QUERY], "a=1");
    }

    #[test]
    fn raw_http_action_wraps_missing_body_as_empty_string() {
        let mut action = Action::new("guest", "pkg", "raw");
        action.annotations.insert("raw-http".to_string(), Value::Bool(true));
        let ctx = ctx_with(HashMap::new(), None);

        let payload = merge_parameters(&action, &ctx, ApiVariant::Main).unwrap();
        assert_eq!(payload[OW_BODY], "");
    }
}
