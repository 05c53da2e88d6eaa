//! In-memory [`IdentityStore`] and [`EntityStore`] implementations.
//!
//! Suitable for single-node deployments and tests. A real deployment backs
//! these traits with the auth store and entity store referenced in §1 —
//! external collaborators this gateway never implements itself.

use async_trait::async_trait;
use gateway_kernel::gateway::{Action, AuthKey, EntityStore, Identity, IdentityStore, Package};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// [`IdentityStore`] backed by a simple `HashMap`, keyed by namespace.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an identity at startup.
    pub async fn register(&self, identity: Identity) {
        self.identities
            .write()
            .await
            .insert(identity.namespace.clone(), identity);
    }

    /// Convenience constructor: a single identity with a generated auth key.
    pub fn single(namespace: impl Into<String>, subject: impl Into<String>) -> (Self, Identity) {
        let namespace = namespace.into();
        let identity = Identity::new(
            namespace.clone(),
            subject,
            AuthKey {
                uuid: uuid::Uuid::new_v4().to_string(),
                secret: uuid::Uuid::new_v4().to_string(),
            },
        );
        let store = Self::default();
        (store, identity)
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn lookup(&self, namespace: &str) -> Option<Identity> {
        self.identities.read().await.get(namespace).cloned()
    }
}

/// [`EntityStore`] backed by simple `HashMap`s, keyed by fully-qualified name.
///
/// Mirrors the package-then-action merge Entity Lookup performs (§4.2):
/// `lookup_action` merges the owning package's default parameters into the
/// returned action before handing it back.
#[derive(Default)]
pub struct InMemoryEntityStore {
    packages: RwLock<HashMap<(String, String), Package>>,
    actions: RwLock<HashMap<(String, String, String), Action>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_package(&self, package: Package) {
        let key = (package.namespace.clone(), package.name.clone());
        self.packages.write().await.insert(key, package);
    }

    pub async fn register_action(&self, action: Action) {
        let key = (action.namespace.clone(), action.package.clone(), action.name.clone());
        self.actions.write().await.insert(key, action);
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn lookup_package(&self, namespace: &str, name: &str) -> Option<Package> {
        let pkg = self
            .packages
            .read()
            .await
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()?;
        // Invariant: a package consumed by the web route must not be a binding.
        if pkg.is_binding {
            return None;
        }
        Some(pkg)
    }

    async fn lookup_action(&self, namespace: &str, package: &str, name: &str) -> Option<Action> {
        let mut action = self
            .actions
            .read()
            .await
            .get(&(namespace.to_string(), package.to_string(), name.to_string()))
            .cloned()?;

        if package != gateway_kernel::gateway::DEFAULT_PACKAGE {
            let pkg = self.lookup_package(namespace, package).await?;
            action.merge_package_defaults(&pkg);
        }
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_kernel::gateway::DEFAULT_PACKAGE;

    #[tokio::test]
    async fn identity_lookup_returns_none_for_unknown_namespace() {
        let store = InMemoryIdentityStore::new();
        assert!(store.lookup("ghost").await.is_none());
    }

    #[tokio::test]
    async fn identity_lookup_returns_registered_identity() {
        let (store, identity) = InMemoryIdentityStore::single("guest", "guest-subject");
        store.register(identity.clone()).await;
        let found = store.lookup("guest").await.unwrap();
        assert_eq!(found.namespace, "guest");
    }

    #[tokio::test]
    async fn package_lookup_rejects_bindings() {
        let store = InMemoryEntityStore::new();
        let mut binding = Package::new("guest", "bound-pkg");
        binding.is_binding = true;
        store.register_package(binding).await;
        assert!(store.lookup_package("guest", "bound-pkg").await.is_none());
    }

    #[tokio::test]
    async fn action_lookup_merges_package_defaults() {
        let store = InMemoryEntityStore::new();
        let mut pkg = Package::new("guest", "pkg");
        pkg.parameters.insert("x".to_string(), serde_json::json!(0));
        store.register_package(pkg).await;

        let action = Action::new("guest", "pkg", "echo");
        store.register_action(action).await;

        let merged = store.lookup_action("guest", "pkg", "echo").await.unwrap();
        assert_eq!(merged.parameters.get("x"), Some(&serde_json::json!(0)));
    }

    #[tokio::test]
    async fn action_lookup_in_default_package_needs_no_package_record() {
        let store = InMemoryEntityStore::new();
        let action = Action::new("guest", DEFAULT_PACKAGE, "hello");
        store.register_action(action).await;
        assert!(store.lookup_action("guest", DEFAULT_PACKAGE, "hello").await.is_some());
    }

    #[tokio::test]
    async fn action_lookup_returns_none_for_unknown_action() {
        let store = InMemoryEntityStore::new();
        assert!(store.lookup_action("guest", DEFAULT_PACKAGE, "ghost").await.is_none());
    }
}
