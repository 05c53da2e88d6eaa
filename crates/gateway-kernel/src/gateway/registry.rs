//! Entity and identity store contracts — kernel contracts.
//!
//! [`EntityStore`] and [`IdentityStore`] are the single kernel-level
//! abstractions for the Identity Lookup and Entity Lookup components.
//! Concrete implementations (in-memory, backed by a real auth/entity
//! service) live in `action-gateway`.

use super::model::{Action, Identity, Package};
use async_trait::async_trait;

// ─────────────────────────────────────────────────────────────────────────────
// IdentityStore
// ─────────────────────────────────────────────────────────────────────────────

/// Kernel contract for Identity Lookup: resolves a namespace segment to an
/// owner [`Identity`] by consulting the auth store.
///
/// Implementations must collapse every failure mode (not found,
/// deserialization error, connection failure) into `None` — the gateway
/// never leaks the distinction to the caller (see §4.2).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve `namespace` to its owner identity, or `None` if unresolvable.
    async fn lookup(&self, namespace: &str) -> Option<Identity>;
}

// ─────────────────────────────────────────────────────────────────────────────
// EntityStore
// ─────────────────────────────────────────────────────────────────────────────

/// Kernel contract for Entity Lookup: retrieves package and action records.
///
/// As with [`IdentityStore`], every failure mode collapses to `None`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Look up a package by `(namespace, name)`. Returns `None` if absent,
    /// undeserializable, or if the record `is_binding` — bindings are never
    /// surfaced by this trait; the web route never sees them (§3 invariant).
    async fn lookup_package(&self, namespace: &str, name: &str) -> Option<Package>;

    /// Look up an action by `(namespace, package, name)`. Returns `None` if
    /// absent or undeserializable. Implementations are expected to have
    /// already merged the package's default parameters into the returned
    /// action via [`Action::merge_package_defaults`].
    async fn lookup_action(&self, namespace: &str, package: &str, name: &str) -> Option<Action>;
}
