//! Core data types for the gateway kernel contract.
//!
//! These types are shared across all gateway traits
//! ([`GatewayFilter`](super::filter::GatewayFilter),
//! [`EntityStore`](super::registry::EntityStore),
//! [`IdentityStore`](super::registry::IdentityStore))
//! and carry no runtime dependencies beyond `serde` and `std`.

use super::model::{Action, Identity, MediaExtension, Package};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP primitives
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP method, covering the standard verbs accepted on the web action route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Case-insensitive parse from a string slice.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    /// Return the standard uppercase string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Lowercased string representation, as injected into `__ow_method`.
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response
// ─────────────────────────────────────────────────────────────────────────────

/// An inbound request flowing through the gateway.
///
/// All fields use owned, allocation-friendly types so the struct can be sent
/// across async task boundaries without lifetime complications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Unique identifier for correlating this request across logs and traces.
    pub id: String,
    /// Request path, e.g. `/api/v1/web/guest/default/hello.json`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// HTTP headers (header names are lowercased).
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Arbitrary metadata attached by filters during processing.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GatewayRequest {
    /// Construct a minimal request with the given id, path, and method.
    pub fn new(id: impl Into<String>, path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            method,
            headers: HashMap::new(),
            body: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Builder helper: attach a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }

    /// Builder helper: set the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// An outbound response produced by the transcoder and returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// HTTP status code (100–599).
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Id of the activation that produced this response (empty for
    /// pre-invocation rejections).
    pub backend_id: String,
    /// End-to-end latency in milliseconds.
    pub latency_ms: u64,
}

impl GatewayResponse {
    /// Construct a minimal response.
    pub fn new(status: u16, backend_id: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
            backend_id: backend_id.into(),
            latency_ms: 0,
        }
    }

    /// Builder helper: attach a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }

    /// Builder helper: set the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Route match — result of the Request Decoder's URL parse
// ─────────────────────────────────────────────────────────────────────────────

/// The result of successfully decoding a web action URL.
///
/// Carries the addressed namespace/package/action and the requested media
/// extension plus projection path — everything needed to drive Identity,
/// Entity, Export Gate, and Throttle in sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMatch {
    pub namespace: String,
    pub package: String,
    pub action: String,
    pub extension: MediaExtension,
    /// URL segments following the action-with-extension segment.
    pub projection_path: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Request context
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable context that flows through the filter chain for a single request.
///
/// Filters read from and write to this context, enabling downstream filters
/// to access decisions made by upstream filters (e.g. the identity resolved
/// by Identity Lookup is read by the Export/Auth Gate and Throttle Checker).
#[derive(Debug, Clone)]
pub struct GatewayContext {
    /// The inbound request.
    pub request: GatewayRequest,
    /// Populated after the Request Decoder runs; `None` beforehand.
    pub route_match: Option<RouteMatch>,
    /// Owner identity of the addressed namespace, resolved by Identity Lookup.
    pub owner_identity: Option<Identity>,
    /// Identity of the authenticated caller, if any (`onBehalfOf` in §3).
    pub caller_identity: Option<Identity>,
    /// The package record, resolved by Entity Lookup.
    pub package: Option<Package>,
    /// The action record, resolved by Entity Lookup (package defaults merged in).
    pub action: Option<Action>,
    /// Free-form attributes written and read by filters.
    pub attributes: HashMap<String, serde_json::Value>,
}

impl GatewayContext {
    /// Create a fresh context from an inbound request.
    pub fn new(request: GatewayRequest) -> Self {
        Self {
            request,
            route_match: None,
            owner_identity: None,
            caller_identity: None,
            package: None,
            action: None,
            attributes: HashMap::new(),
        }
    }

    /// Convenience: read a typed attribute, returning `None` if absent or
    /// if deserialization fails.
    pub fn get_attr<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Convenience: write a serializable attribute.
    pub fn set_attr<T: serde::Serialize>(&mut self, key: impl Into<String>, val: &T) {
        if let Ok(v) = serde_json::to_value(val) {
            self.attributes.insert(key.into(), v);
        }
    }
}
