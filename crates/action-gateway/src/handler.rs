//! Top-level request handler, wiring every stage of §4 together in the
//! control-flow order fixed by §2: Request Decoder → (Identity → Entity →
//! Export Gate → Throttle) → Parameter Merge → Invocation → Transcoder.

use crate::config::GatewayServerConfig;
use crate::error::{reject_response, GatewayError};
use crate::pipeline::FilterPipeline;
use crate::{decode, merge, transcode};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gateway_kernel::gateway::{EntityStore, GatewayContext, GatewayRequest, HttpMethod, Identity, IdentityStore};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct AppState {
    pub config: GatewayServerConfig,
    pub variant: crate::merge::ApiVariant,
    pub identity_store: Arc<dyn IdentityStore>,
    pub entity_store: Arc<dyn EntityStore>,
    pub invoker: Arc<dyn crate::invoke::Invoker>,
    pub filters: FilterPipeline,
}

fn axum_method_to_kernel(method: &Method) -> Option<HttpMethod> {
    HttpMethod::from_str_ci(method.as_str())
}

/// Check an `Authorization: Basic <uuid>:<secret>` header against the owner
/// identity's auth key. There is no separate caller identity store in scope
/// (§1) — a caller who presents the owner's own key is "the authenticated
/// caller" for the purposes of the Export/Auth Gate.
fn authenticate_caller(headers: &HeaderMap, owner: &Identity) -> Option<Identity> {
    let auth_header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = auth_header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (uuid, secret) = decoded.split_once(':')?;
    if uuid == owner.auth_key.uuid && secret == owner.auth_key.secret {
        Some(owner.clone())
    } else {
        None
    }
}

fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    raw.and_then(|q| serde_urlencoded::from_str(q).ok()).unwrap_or_default()
}

pub async fn handle_web_action(
    State(state): State<Arc<AppState>>,
    Path(tail): Path<String>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Response {
    match run(&state, tail, method, headers, raw_query, body).await {
        Ok(resp) => resp,
        Err(e) => e.into_response(),
    }
}

async fn run(
    state: &AppState,
    tail: String,
    method: Method,
    headers: HeaderMap,
    raw_query: Option<String>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let started_at = std::time::Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let kernel_method = axum_method_to_kernel(&method)
        .ok_or_else(|| GatewayError::BadInput(format!("unsupported method: {method}")))?;

    let enforce_extension = state.config.enforce_extension || state.variant.forces_enforce_extension();
    let route = decode::decode_route(&tail, enforce_extension)?;

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let parsed_body = decode::decode_body(content_type, &body, state.config.entity_size_limit_bytes)?;

    let query = parse_query(raw_query.as_deref());

    // Identity Lookup and Entity Lookup address independent stores (§5) and
    // run concurrently rather than one after the other.
    let (owner, action) = tokio::join!(
        state.identity_store.lookup(&route.namespace),
        state.entity_store.lookup_action(&route.namespace, &route.package, &route.action),
    );
    let owner = owner.ok_or_else(|| GatewayError::LookupMissing("namespace not found".to_string()))?;
    let action = action.ok_or_else(|| GatewayError::LookupMissing("action not found".to_string()))?;

    let caller = authenticate_caller(&headers, &owner);

    let header_pairs: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_lowercase(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    let invocation_ctx = decode::build_context(
        kernel_method,
        header_pairs,
        &route,
        query,
        parsed_body,
        caller.as_ref().map(|c| c.namespace.clone()),
    );

    let mut gw_request = GatewayRequest::new(request_id.clone(), format!("/{tail}"), kernel_method);
    gw_request.headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_lowercase(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    let mut ctx = GatewayContext::new(gw_request);
    ctx.owner_identity = Some(owner.clone());
    ctx.caller_identity = caller;
    ctx.action = Some(action.clone());

    match state.filters.run_request(&mut ctx).await {
        Ok(gateway_kernel::gateway::FilterAction::Continue) => {}
        Ok(gateway_kernel::gateway::FilterAction::Reject(status, message)) => {
            return Ok(reject_response(status, &message));
        }
        Ok(gateway_kernel::gateway::FilterAction::Redirect(location)) => {
            return Ok((
                StatusCode::FOUND,
                [(axum::http::header::LOCATION, location)],
            )
                .into_response());
        }
        Err(e) => return Err(GatewayError::Internal(e.to_string())),
    }

    let payload = merge::merge_parameters(&action, &invocation_ctx, state.variant)?;

    let (activation_id, activation) = state
        .invoker
        .invoke(
            &owner,
            &action,
            payload,
            std::time::Duration::from_millis(state.config.max_blocking_wait_ms),
        )
        .await
        .map_err(GatewayError::Internal)?;

    let Some(activation) = activation else {
        return Err(GatewayError::NotReady(activation_id));
    };

    let rendered = transcode::transcode(&activation, route.extension, &route.projection_path)?;

    let mut gw_response = gateway_kernel::gateway::GatewayResponse::new(rendered.status, activation_id);
    gw_response.headers = rendered.headers.iter().cloned().collect();
    gw_response.body = rendered.body.clone();
    gw_response.latency_ms = started_at.elapsed().as_millis() as u64;
    state
        .filters
        .run_response(&ctx, &mut gw_response)
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    let mut response = Response::builder().status(rendered.status);
    for (k, v) in &rendered.headers {
        response = response.header(k, v);
    }
    Ok(response.body(axum::body::Body::from(rendered.body)).unwrap())
}
