//! Rewriters and implicators, registered once at boot
//!
//! Subsystems contribute canonicalization rules (rewriters) and computed
//! grants (implicators) while the process starts up; the registry is then
//! shared immutably with the decision engine. There is no interior
//! mutability — registration takes `&mut self`, checks take `&self` — so
//! concurrent reads need no synchronization.

use crate::actor::Actor;
use async_trait::async_trait;
use std::sync::Arc;
use strata_core::StrataResult;

/// A canonicalization rule for permission strings
///
/// Applied in registration order before any other logic sees the string;
/// used for e.g. legacy-name migration. Rewriters must be idempotent:
/// rewriting an already-rewritten string is a no-op. The registry does
/// not enforce this — each rewriter guarantees it for itself.
pub trait PermissionRewriter: Send + Sync {
    /// Stable identifier, used in logs
    fn id(&self) -> &str;

    /// Whether this rewriter applies to `permission`
    fn matches(&self, permission: &str) -> bool;

    /// Produce the canonical form
    fn rewrite(&self, permission: String) -> String;
}

/// A computed, non-persisted grant rule
///
/// Encodes structural facts ("the owner of an app may always use it")
/// that are keyed to one canonical permission form. The engine consults
/// implicators only for the exact rewritten string, never its parent
/// prefixes.
#[async_trait]
pub trait PermissionImplicator: Send + Sync {
    /// Stable identifier, used in logs
    fn id(&self) -> &str;

    /// Whether this implicator applies to `permission`
    fn matches(&self, permission: &str) -> bool;

    /// The computed grant for `actor`, if any
    async fn check(
        &self,
        actor: &Actor,
        permission: &str,
    ) -> StrataResult<Option<serde_json::Value>>;
}

/// Append-only registries of rewriters and implicators
#[derive(Default)]
pub struct PermissionRegistry {
    rewriters: Vec<Arc<dyn PermissionRewriter>>,
    implicators: Vec<Arc<dyn PermissionImplicator>>,
}

impl PermissionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rewriter (boot-time only)
    pub fn register_rewriter(&mut self, rewriter: Arc<dyn PermissionRewriter>) {
        tracing::debug!(id = rewriter.id(), "registered permission rewriter");
        self.rewriters.push(rewriter);
    }

    /// Append an implicator (boot-time only)
    pub fn register_implicator(&mut self, implicator: Arc<dyn PermissionImplicator>) {
        tracing::debug!(id = implicator.id(), "registered permission implicator");
        self.implicators.push(implicator);
    }

    /// Fold every matching rewriter over `permission` in registration order
    pub fn rewrite(&self, permission: String) -> String {
        self.rewriters.iter().fold(permission, |current, rewriter| {
            if rewriter.matches(&current) {
                let rewritten = rewriter.rewrite(current);
                tracing::trace!(id = rewriter.id(), permission = %rewritten, "permission rewritten");
                rewritten
            } else {
                current
            }
        })
    }

    /// Registered implicators in registration order
    pub fn implicators(&self) -> &[Arc<dyn PermissionImplicator>] {
        &self.implicators
    }
}

impl std::fmt::Debug for PermissionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionRegistry")
            .field("rewriters", &self.rewriters.len())
            .field("implicators", &self.implicators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PrefixRewriter {
        id: &'static str,
        from: &'static str,
        to: &'static str,
    }

    impl PermissionRewriter for PrefixRewriter {
        fn id(&self) -> &str {
            self.id
        }

        fn matches(&self, permission: &str) -> bool {
            permission.starts_with(self.from)
        }

        fn rewrite(&self, permission: String) -> String {
            format!("{}{}", self.to, &permission[self.from.len()..])
        }
    }

    #[test]
    fn rewrite_folds_in_registration_order() {
        let mut registry = PermissionRegistry::new();
        registry.register_rewriter(Arc::new(PrefixRewriter {
            id: "legacy-kv",
            from: "kvstore:",
            to: "driver:kv:",
        }));
        registry.register_rewriter(Arc::new(PrefixRewriter {
            id: "driver-casing",
            from: "driver:kv:Get",
            to: "driver:kv:get",
        }));

        assert_eq!(
            registry.rewrite("kvstore:Get".to_string()),
            "driver:kv:get"
        );
    }

    #[test]
    fn non_matching_rewriters_leave_string_alone() {
        let mut registry = PermissionRegistry::new();
        registry.register_rewriter(Arc::new(PrefixRewriter {
            id: "legacy-kv",
            from: "kvstore:",
            to: "driver:kv:",
        }));

        assert_eq!(registry.rewrite("fs:abc:read".to_string()), "fs:abc:read");
    }

    #[test]
    fn idempotent_rewriter_is_stable_under_reapplication() {
        let mut registry = PermissionRegistry::new();
        registry.register_rewriter(Arc::new(PrefixRewriter {
            id: "legacy-kv",
            from: "kvstore:",
            to: "driver:kv:",
        }));

        let once = registry.rewrite("kvstore:get".to_string());
        let twice = registry.rewrite(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_registry_rewrites_to_identity() {
        let registry = PermissionRegistry::new();
        assert_eq!(registry.rewrite("driver:kv".to_string()), "driver:kv");
        assert!(registry.implicators().is_empty());
    }
}
