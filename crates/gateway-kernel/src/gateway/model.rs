//! Core entity model for the web action gateway: identities, packages,
//! actions, activations, and the media-extension projection table.
//!
//! These types are pure data — no I/O, no axum. The stores that produce them
//! (auth store, entity store, entitlement provider) live in the runtime crate
//! (`action-gateway`); this module only fixes their shape and the structural
//! invariants checked on them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// An auth key: a UUID paired with a secret, as issued by the auth store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthKey {
    pub uuid: String,
    pub secret: String,
}

/// The owner of a namespace. Immutable once resolved; carries a quota handle
/// used by the throttle checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub namespace: String,
    pub subject: String,
    pub auth_key: AuthKey,
    /// Activations already counted against this identity's quota window.
    pub concurrent_invocations: u32,
    /// Maximum activations this identity may have outstanding at once.
    pub invocation_quota: u32,
}

impl Identity {
    pub fn new(namespace: impl Into<String>, subject: impl Into<String>, auth_key: AuthKey) -> Self {
        Self {
            namespace: namespace.into(),
            subject: subject.into(),
            auth_key,
            concurrent_invocations: 0,
            invocation_quota: u32::MAX,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Package
// ─────────────────────────────────────────────────────────────────────────────

/// A named grouping of actions in a namespace, with shared default parameters.
///
/// Invariant: a package consumed by the web action gateway must not be a
/// binding — bindings are rejected before the gateway ever sees the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub namespace: String,
    pub name: String,
    pub parameters: HashMap<String, serde_json::Value>,
    pub is_binding: bool,
    pub publish: bool,
    pub annotations: HashMap<String, serde_json::Value>,
}

impl Package {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            parameters: HashMap::new(),
            is_binding: false,
            publish: false,
            annotations: HashMap::new(),
        }
    }
}

/// The default package every namespace implicitly has — carries no
/// parameters and is never a binding.
pub const DEFAULT_PACKAGE: &str = "default";

// ─────────────────────────────────────────────────────────────────────────────
// Action
// ─────────────────────────────────────────────────────────────────────────────

/// Annotation key consumed by the Export & Auth Gate.
pub const ANNOTATION_WEB_EXPORT: &str = "web-export";
/// Annotation key marking an action as receiving the unparsed request body.
pub const ANNOTATION_RAW_HTTP: &str = "raw-http";
/// Annotation key marking an action as authenticated-only.
pub const ANNOTATION_REQUIRE_WHISK_AUTH: &str = "require-whisk-auth";
/// Per-parameter annotation key; parameters carrying `final: true` become
/// immutable (the caller may not override them at invocation time).
pub const ANNOTATION_FINAL: &str = "final";

/// A named, invokable function unit with parameters, annotations, and an
/// executable reference (the reference itself is opaque to the gateway).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub namespace: String,
    pub package: String,
    pub name: String,
    pub parameters: HashMap<String, serde_json::Value>,
    /// Parameter names the caller may not override — computed from each
    /// parameter's `final` annotation when the action was defined.
    pub immutable_parameters: std::collections::HashSet<String>,
    pub annotations: HashMap<String, serde_json::Value>,
    /// Invocation timeout configured on the action itself, in milliseconds.
    pub timeout_ms: u64,
}

impl Action {
    pub fn new(namespace: impl Into<String>, package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            package: package.into(),
            name: name.into(),
            parameters: HashMap::new(),
            immutable_parameters: std::collections::HashSet::new(),
            annotations: HashMap::new(),
            timeout_ms: 60_000,
        }
    }

    fn annotation_bool(&self, key: &str) -> bool {
        self.annotations
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// `web-export: true` — required for anonymous invocation via the web route.
    pub fn is_web_exported(&self) -> bool {
        self.annotation_bool(ANNOTATION_WEB_EXPORT)
    }

    /// `require-whisk-auth: true` — the action may only be invoked by an
    /// authenticated caller.
    pub fn requires_auth(&self) -> bool {
        self.annotation_bool(ANNOTATION_REQUIRE_WHISK_AUTH)
    }

    /// `raw-http: true` — the action receives the unparsed body as a single
    /// opaque value instead of merged JSON parameters.
    pub fn is_raw_http(&self) -> bool {
        self.annotation_bool(ANNOTATION_RAW_HTTP)
    }

    /// Merge a package's default parameters into this action's own
    /// parameters. Action-level parameters take precedence over the
    /// package's — this mirrors the first step of the precedence order in
    /// §4.5 (`package.parameters → action.parameters`).
    pub fn merge_package_defaults(&mut self, package: &Package) {
        for (k, v) in &package.parameters {
            self.parameters.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Activation
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome status of an invoked action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationStatus {
    Success,
    ApplicationError,
    DeveloperError,
    SystemError,
}

/// The outcome of invoking an action. Created by the invoker; the gateway
/// only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activation {
    pub activation_id: String,
    pub result: serde_json::Value,
    pub status: ActivationStatus,
}

impl Activation {
    pub fn new(activation_id: impl Into<String>, result: serde_json::Value, status: ActivationStatus) -> Self {
        Self {
            activation_id: activation_id.into(),
            result,
            status,
        }
    }
}

/// Field name inside an `applicationError` result that carries the error
/// payload to project when the error fold applies.
pub const ERROR_FIELD: &str = "error";

// ─────────────────────────────────────────────────────────────────────────────
// MediaExtension
// ─────────────────────────────────────────────────────────────────────────────

/// One of the five recognized web-action media extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaExtension {
    Http,
    Json,
    Html,
    Svg,
    Text,
}

impl MediaExtension {
    /// Lowercase extension string as it appears in the URL (without the dot).
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaExtension::Http => "http",
            MediaExtension::Json => "json",
            MediaExtension::Html => "html",
            MediaExtension::Svg => "svg",
            MediaExtension::Text => "text",
        }
    }

    /// Case-insensitive parse — the split regex that recognizes extensions is
    /// case-insensitive, but the lookup table itself is lowercase, so callers
    /// normalize through this function rather than matching raw strings.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Some(MediaExtension::Http),
            "json" => Some(MediaExtension::Json),
            "html" => Some(MediaExtension::Html),
            "svg" => Some(MediaExtension::Svg),
            "text" => Some(MediaExtension::Text),
            _ => None,
        }
    }

    /// All recognized extensions, longest-suffix-match order (none of the
    /// current names are prefixes of one another, so ordering does not
    /// currently affect matching, but the table is still walked in this
    /// fixed order for determinism).
    pub const ALL: [MediaExtension; 5] = [
        MediaExtension::Http,
        MediaExtension::Json,
        MediaExtension::Html,
        MediaExtension::Svg,
        MediaExtension::Text,
    ];

    /// Default extension used when the URL supplies no recognized suffix and
    /// `enforceExtension` is false.
    pub fn default_when_unenforced() -> Self {
        MediaExtension::Http
    }

    /// Whether a caller-supplied projection path is honored for this
    /// extension, per the static media-extension table in §3.
    pub fn projection_allowed(&self) -> bool {
        !matches!(self, MediaExtension::Http)
    }

    /// The projection applied when the caller supplies no projection path of
    /// their own, if any.
    ///
    /// `.text`, `.html`, and `.svg` each default to projecting the result
    /// field sharing their own name (`text`, `html`, `svg`) — the convention
    /// the referenced system uses so an action can return
    /// `{"html": "<p>…</p>"}` and have `page.html` render it without the
    /// caller spelling out `/html` in the URL. `.json` and `.http` have no
    /// default: `.json` renders the whole result object, and `.http` projects
    /// per its own envelope rule regardless of this table.
    pub fn default_projection(&self) -> Option<&'static [&'static str]> {
        match self {
            MediaExtension::Text => Some(&["text"]),
            MediaExtension::Html => Some(&["html"]),
            MediaExtension::Svg => Some(&["svg"]),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InvocationContext
// ─────────────────────────────────────────────────────────────────────────────

/// Per-request, ephemeral context assembled by the Request Decoder and
/// consumed by the Invocation stage. Discarded once the response is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationContext {
    pub method: crate::gateway::types::HttpMethod,
    /// Ordered sequence of `(name, value)` header pairs, names lowercased.
    pub headers: Vec<(String, String)>,
    /// The URL suffix after the action name — the "projection path".
    pub path: String,
    pub query: HashMap<String, String>,
    /// `None` when the request carried no entity body.
    pub body: Option<serde_json::Value>,
    pub extension: MediaExtension,
    /// The authenticated caller's namespace, if the request carried valid
    /// credentials.
    pub on_behalf_of: Option<String>,
}

impl InvocationContext {
    pub fn new(method: crate::gateway::types::HttpMethod, extension: MediaExtension) -> Self {
        Self {
            method,
            headers: Vec::new(),
            path: String::new(),
            query: HashMap::new(),
            body: None,
            extension,
            on_behalf_of: None,
        }
    }
}
