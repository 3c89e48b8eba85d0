//! The permission decision engine
//!
//! Answers "may actor A perform permission P" per actor variant:
//!
//! - **System**: always granted; absolute trust boundary
//! - **User**: implicit table → implicators → persisted grants with
//!   issuer re-validation
//! - **AppUnderUser**: the user's own permissions are the ceiling, then
//!   app defaults → app groups → persisted user→app grants
//! - **AccessToken**: the authorizer's current permissions are the
//!   ceiling, then an exact-match token row
//!
//! Every recursive re-check (issuer validation, delegation ceilings)
//! threads a depth counter; exhausting the budget denies rather than
//! recursing further, so cyclical grant or delegation chains fail safely.
//!
//! Denial is `Ok(None)`. A grant is `Some(extra)`; `extra` is often the
//! empty object.

use crate::actor::{Actor, AppUnderUserActor, UserActor};
use crate::permission::grammar::parent_permissions;
use crate::permission::registry::PermissionRegistry;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use strata_core::{AppId, AuthorizationConfig, StrataError, StrataResult};
use strata_store::{
    AppGrantRow, AuditAction, AuditEntry, GrantStore, IdentityStore, TokenStore, UserGrantRow,
};

/// Permissions every active user holds without any stored row
static IMPLICIT_USER_PERMISSIONS: Lazy<Vec<(&'static str, Value)>> = Lazy::new(|| {
    vec![
        // Every tenant may inspect their own identity and notify themselves.
        ("whoami", json!({})),
        ("notify:self", json!({})),
    ]
});

fn implicit_user_permission(permission: &str) -> Option<Value> {
    IMPLICIT_USER_PERMISSIONS
        .iter()
        .find(|(implicit, _)| *implicit == permission)
        .map(|(_, extra)| extra.clone())
}

type CheckFuture<'a> = Pin<Box<dyn Future<Output = StrataResult<Option<Value>>> + Send + 'a>>;

/// The decision engine
///
/// Holds its collaborators explicitly — stores, the boot-time registry,
/// and configuration — and no other state; checks are fully concurrent.
pub struct PermissionEngine {
    identity: Arc<dyn IdentityStore>,
    grants: Arc<dyn GrantStore>,
    tokens: Arc<dyn TokenStore>,
    registry: Arc<PermissionRegistry>,
    config: AuthorizationConfig,
}

impl PermissionEngine {
    /// Create an engine over the given seams
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        grants: Arc<dyn GrantStore>,
        tokens: Arc<dyn TokenStore>,
        registry: Arc<PermissionRegistry>,
        config: AuthorizationConfig,
    ) -> StrataResult<Self> {
        config.validate()?;
        Ok(Self {
            identity,
            grants,
            tokens,
            registry,
            config,
        })
    }

    /// May `actor` perform `permission`?
    ///
    /// `Ok(None)` is denial; `Ok(Some(extra))` is a grant carrying the
    /// matched rule's extra data.
    pub async fn check(&self, actor: &Actor, permission: &str) -> StrataResult<Option<Value>> {
        self.check_at_depth(actor, permission, 0).await
    }

    fn check_at_depth<'a>(
        &'a self,
        actor: &'a Actor,
        permission: &'a str,
        depth: usize,
    ) -> CheckFuture<'a> {
        Box::pin(async move {
            if depth > self.config.max_check_depth {
                tracing::warn!(
                    actor = %actor.uid(),
                    permission,
                    depth,
                    "permission re-check depth exhausted; denying"
                );
                return Ok(None);
            }

            match actor {
                Actor::System => Ok(Some(json!({}))),
                Actor::User(user_actor) => {
                    self.check_user_permission(user_actor, permission, depth).await
                }
                Actor::AppUnderUser(app_actor) => {
                    // An app can never exceed its user's ceiling.
                    let user_actor = UserActor {
                        user: app_actor.user.clone(),
                        session: None,
                    };
                    if self
                        .check_user_permission(&user_actor, permission, depth)
                        .await?
                        .is_none()
                    {
                        return Ok(None);
                    }
                    self.check_user_app_permission(app_actor, permission).await
                }
                Actor::AccessToken(token_actor) => {
                    // A token can never exceed its authorizer's ceiling.
                    if self
                        .check_at_depth(&token_actor.authorizer, permission, depth + 1)
                        .await?
                        .is_none()
                    {
                        return Ok(None);
                    }
                    // Tokens are scoped to exactly what was granted at
                    // issuance; no parent fallback.
                    let rewritten = self.registry.rewrite(permission.to_string());
                    self.tokens
                        .token_permission(token_actor.token, &rewritten)
                        .await
                }
            }
        })
    }

    async fn check_user_permission(
        &self,
        actor: &UserActor,
        permission: &str,
        depth: usize,
    ) -> StrataResult<Option<Value>> {
        if actor.user.suspended {
            tracing::debug!(user = %actor.user.id, "suspended user holds no permissions");
            return Ok(None);
        }

        let permission = self.registry.rewrite(permission.to_string());
        let parents = parent_permissions(&permission);

        for parent in &parents {
            if let Some(extra) = implicit_user_permission(parent) {
                tracing::debug!(user = %actor.user.id, permission = %parent, "implicit permission");
                return Ok(Some(extra));
            }
        }

        // Implicators see only the exact rewritten string, never parents.
        let as_actor = Actor::User(actor.clone());
        for implicator in self.registry.implicators() {
            if !implicator.matches(&permission) {
                continue;
            }
            if let Some(extra) = implicator.check(&as_actor, &permission).await? {
                tracing::debug!(
                    user = %actor.user.id,
                    permission = %permission,
                    implicator = implicator.id(),
                    "implicator granted permission"
                );
                return Ok(Some(extra));
            }
        }

        let rows = self.grants.user_grants_for(actor.user.id, &parents).await?;
        for row in rows {
            let Some(issuer) = self.identity.user_by_id(row.issuer).await? else {
                tracing::warn!(
                    holder = %row.holder,
                    issuer = %row.issuer,
                    permission = %row.permission,
                    "grant row references missing issuer; skipping"
                );
                continue;
            };
            // A grant only survives while its issuer still holds the same
            // permission; revoking upstream revokes transitively.
            let issuer_actor = Actor::user(issuer);
            if self
                .check_at_depth(&issuer_actor, &row.permission, depth + 1)
                .await?
                .is_some()
            {
                tracing::debug!(
                    user = %actor.user.id,
                    permission = %row.permission,
                    issuer = %row.issuer,
                    "persisted grant matched"
                );
                return Ok(Some(row.extra));
            }
        }

        Ok(None)
    }

    async fn check_user_app_permission(
        &self,
        actor: &AppUnderUserActor,
        permission: &str,
    ) -> StrataResult<Option<Value>> {
        let permission = self.registry.rewrite(permission.to_string());
        let parents = parent_permissions(&permission);

        for parent in &parents {
            if let Some(spec) = self
                .config
                .default_app_permissions
                .iter()
                .find(|spec| spec.permission == *parent)
            {
                tracing::debug!(app = %actor.app.uid, permission = %parent, "default app permission");
                return Ok(Some(spec.extra.clone()));
            }
        }

        for group in &self.config.implicit_app_groups {
            if !group.apps.contains(&actor.app.uid) {
                continue;
            }
            for parent in &parents {
                if let Some(spec) = group
                    .permissions
                    .iter()
                    .find(|spec| spec.permission == *parent)
                {
                    tracing::debug!(
                        app = %actor.app.uid,
                        group = %group.name,
                        permission = %parent,
                        "app group permission"
                    );
                    return Ok(Some(spec.extra.clone()));
                }
            }
        }

        let rows = self
            .grants
            .app_grants_for(actor.user.id, actor.app.uid, &parents)
            .await?;
        if let Some(row) = rows.into_iter().next() {
            tracing::debug!(
                app = %actor.app.uid,
                permission = %row.permission,
                "persisted app grant matched"
            );
            return Ok(Some(row.extra));
        }

        Ok(None)
    }

    /// Grant `permission` from the acting user to `holder_username`
    ///
    /// Idempotent on the grant triple; the audit row is written in the
    /// same store call as the grant row.
    pub async fn grant_user_user(
        &self,
        actor: &Actor,
        holder_username: &str,
        permission: &str,
        extra: Value,
        reason: Option<String>,
    ) -> StrataResult<()> {
        let issuer = actor.related_user()?;
        let holder = self
            .identity
            .user_by_username(holder_username)
            .await?
            .ok_or_else(|| StrataError::not_found(format!("user {holder_username}")))?;

        if holder.id == issuer.user.id {
            return Err(StrataError::invalid(
                "cannot grant a permission to yourself",
            ));
        }

        let permission = self.registry.rewrite(permission.to_string());
        let target_uid = Actor::user(holder.clone()).uid();
        let row = UserGrantRow {
            holder: holder.id,
            issuer: issuer.user.id,
            permission: permission.clone(),
            extra,
        };
        let audit = AuditEntry::record(
            actor.uid(),
            AuditAction::Grant,
            permission.clone(),
            target_uid,
            reason,
        );
        self.grants.upsert_user_grant(row, audit).await?;
        tracing::info!(
            issuer = %issuer.user.id,
            holder = %holder.id,
            permission = %permission,
            "user permission granted"
        );
        Ok(())
    }

    /// Revoke a user→user grant issued by the acting user
    pub async fn revoke_user_user(
        &self,
        actor: &Actor,
        holder_username: &str,
        permission: &str,
        reason: Option<String>,
    ) -> StrataResult<()> {
        let issuer = actor.related_user()?;
        let holder = self
            .identity
            .user_by_username(holder_username)
            .await?
            .ok_or_else(|| StrataError::not_found(format!("user {holder_username}")))?;

        let permission = self.registry.rewrite(permission.to_string());
        let target_uid = Actor::user(holder.clone()).uid();
        let audit = AuditEntry::record(
            actor.uid(),
            AuditAction::Revoke,
            permission.clone(),
            target_uid,
            reason,
        );
        self.grants
            .delete_user_grant(holder.id, issuer.user.id, &permission, audit)
            .await?;
        tracing::info!(
            issuer = %issuer.user.id,
            holder = %holder.id,
            permission = %permission,
            "user permission revoked"
        );
        Ok(())
    }

    /// Grant `permission` to `app` when it acts under the acting user
    pub async fn grant_user_app(
        &self,
        actor: &Actor,
        app_uid: AppId,
        permission: &str,
        extra: Value,
        reason: Option<String>,
    ) -> StrataResult<()> {
        let issuer = actor.related_user()?;
        let app = self
            .identity
            .app_by_uid(app_uid)
            .await?
            .ok_or_else(|| StrataError::not_found(format!("app {app_uid}")))?;

        let permission = self.registry.rewrite(permission.to_string());
        let target_uid = Actor::app_under_user(issuer.user.clone(), app.clone()).uid();
        let row = AppGrantRow {
            user: issuer.user.id,
            app: app.uid,
            permission: permission.clone(),
            extra,
        };
        let audit = AuditEntry::record(
            actor.uid(),
            AuditAction::Grant,
            permission.clone(),
            target_uid,
            reason,
        );
        self.grants.upsert_app_grant(row, audit).await?;
        tracing::info!(
            user = %issuer.user.id,
            app = %app.uid,
            permission = %permission,
            "app permission granted"
        );
        Ok(())
    }

    /// Revoke a user→app grant for the acting user
    pub async fn revoke_user_app(
        &self,
        actor: &Actor,
        app_uid: AppId,
        permission: &str,
        reason: Option<String>,
    ) -> StrataResult<()> {
        let issuer = actor.related_user()?;
        let app = self
            .identity
            .app_by_uid(app_uid)
            .await?
            .ok_or_else(|| StrataError::not_found(format!("app {app_uid}")))?;

        let permission = self.registry.rewrite(permission.to_string());
        let target_uid = Actor::app_under_user(issuer.user.clone(), app.clone()).uid();
        let audit = AuditEntry::record(
            actor.uid(),
            AuditAction::Revoke,
            permission.clone(),
            target_uid,
            reason,
        );
        self.grants
            .delete_app_grant(issuer.user.id, app.uid, &permission, audit)
            .await?;
        tracing::info!(
            user = %issuer.user.id,
            app = %app.uid,
            permission = %permission,
            "app permission revoked"
        );
        Ok(())
    }
}

impl std::fmt::Debug for PermissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionEngine")
            .field("registry", &self.registry)
            .field("max_check_depth", &self.config.max_check_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::registry::PermissionImplicator;
    use async_trait::async_trait;
    use strata_core::{AppRecord, GrantSpec, UserId, UserRecord};
    use strata_store::MemoryStore;

    /// Grants one exact permission to one username, unconditionally.
    struct GrantTo {
        username: &'static str,
        permission: &'static str,
    }

    #[async_trait]
    impl PermissionImplicator for GrantTo {
        fn id(&self) -> &str {
            "test-grant-to"
        }

        fn matches(&self, permission: &str) -> bool {
            permission == self.permission
        }

        async fn check(&self, actor: &Actor, _permission: &str) -> StrataResult<Option<Value>> {
            match actor.related_user() {
                Ok(user) if user.user.username == self.username => Ok(Some(json!({}))),
                _ => Ok(None),
            }
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        engine: PermissionEngine,
    }

    fn fixture_with(
        registry: PermissionRegistry,
        config: AuthorizationConfig,
    ) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let engine = PermissionEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(registry),
            config,
        )
        .expect("valid config");
        Fixture { store, engine }
    }

    fn fixture() -> Fixture {
        let mut registry = PermissionRegistry::new();
        registry.register_implicator(Arc::new(GrantTo {
            username: "carol",
            permission: "driver:kv",
        }));
        fixture_with(registry, AuthorizationConfig::default())
    }

    fn user(store: &MemoryStore, name: &str) -> UserRecord {
        let record = UserRecord::new(UserId::new(), name);
        store.add_user(record.clone()).expect("add user");
        record
    }

    #[tokio::test]
    async fn system_actor_is_always_granted() {
        let f = fixture();
        let granted = f
            .engine
            .check(&Actor::system(), "anything:at:all")
            .await
            .expect("check");
        assert_eq!(granted, Some(json!({})));
    }

    #[tokio::test]
    async fn implicit_table_covers_parents() {
        let f = fixture();
        let alice = user(&f.store, "alice");
        let actor = Actor::user(alice);

        let granted = f.engine.check(&actor, "whoami").await.expect("check");
        assert_eq!(granted, Some(json!({})));

        // A narrower permission falls back onto the implicit parent.
        let granted = f.engine.check(&actor, "whoami:full").await.expect("check");
        assert_eq!(granted, Some(json!({})));
    }

    #[tokio::test]
    async fn denial_is_none_not_error() {
        let f = fixture();
        let alice = user(&f.store, "alice");
        let granted = f
            .engine
            .check(&Actor::user(alice), "driver:sql:query")
            .await
            .expect("check");
        assert!(granted.is_none());
    }

    #[tokio::test]
    async fn implicators_see_exact_string_only() {
        let f = fixture();
        let carol = user(&f.store, "carol");
        let actor = Actor::user(carol);

        // Exact match: granted by the implicator.
        let granted = f.engine.check(&actor, "driver:kv").await.expect("check");
        assert!(granted.is_some());

        // The implicator is keyed to the exact form; a narrower string
        // does not consult it, and no other basis exists.
        let granted = f.engine.check(&actor, "driver:kv:get").await.expect("check");
        assert!(granted.is_none());
    }

    #[tokio::test]
    async fn hierarchy_fallback_through_grants() {
        let f = fixture();
        let carol = user(&f.store, "carol");
        let bob = user(&f.store, "bob");

        f.engine
            .grant_user_user(&Actor::user(carol), "bob", "driver:kv", json!({}), None)
            .await
            .expect("grant");

        // Holding driver:kv covers driver:kv:get without a separate row.
        let granted = f
            .engine
            .check(&Actor::user(bob), "driver:kv:get")
            .await
            .expect("check");
        assert_eq!(granted, Some(json!({})));
    }

    #[tokio::test]
    async fn grant_extra_is_returned_and_upserted() {
        let f = fixture();
        let carol = user(&f.store, "carol");
        let bob = user(&f.store, "bob");
        let carol_actor = Actor::user(carol);

        f.engine
            .grant_user_user(&carol_actor, "bob", "driver:kv", json!({ "quota": 1 }), None)
            .await
            .expect("grant");
        f.engine
            .grant_user_user(&carol_actor, "bob", "driver:kv", json!({ "quota": 9 }), None)
            .await
            .expect("re-grant");

        let granted = f
            .engine
            .check(&Actor::user(bob), "driver:kv")
            .await
            .expect("check");
        assert_eq!(granted, Some(json!({ "quota": 9 })));
    }

    #[tokio::test]
    async fn transitive_revocation() {
        let f = fixture();
        let carol = user(&f.store, "carol");
        let alice = user(&f.store, "alice");
        let bob = user(&f.store, "bob");

        // carol (implicator basis) → alice → bob
        f.engine
            .grant_user_user(&Actor::user(carol.clone()), "alice", "driver:kv", json!({}), None)
            .await
            .expect("grant to alice");
        f.engine
            .grant_user_user(&Actor::user(alice.clone()), "bob", "driver:kv", json!({}), None)
            .await
            .expect("grant to bob");

        let bob_actor = Actor::user(bob);
        assert!(f
            .engine
            .check(&bob_actor, "driver:kv")
            .await
            .expect("check")
            .is_some());

        // Cutting carol → alice revokes bob transitively: alice no longer
        // holds the permission, so her grant to bob is dead.
        f.engine
            .revoke_user_user(&Actor::user(carol), "alice", "driver:kv", None)
            .await
            .expect("revoke");

        assert!(f
            .engine
            .check(&bob_actor, "driver:kv")
            .await
            .expect("check")
            .is_none());
    }

    #[tokio::test]
    async fn suspended_issuer_kills_downstream_grants() {
        let f = fixture();
        let carol = user(&f.store, "carol");
        let bob = user(&f.store, "bob");

        f.engine
            .grant_user_user(&Actor::user(carol.clone()), "bob", "driver:kv", json!({}), None)
            .await
            .expect("grant");

        let bob_actor = Actor::user(bob);
        assert!(f
            .engine
            .check(&bob_actor, "driver:kv")
            .await
            .expect("check")
            .is_some());

        f.store.set_user_suspended(carol.id, true).expect("suspend");
        assert!(f
            .engine
            .check(&bob_actor, "driver:kv")
            .await
            .expect("check")
            .is_none());
    }

    #[tokio::test]
    async fn self_grant_is_rejected() {
        let f = fixture();
        let carol = user(&f.store, "carol");

        let result = f
            .engine
            .grant_user_user(&Actor::user(carol), "carol", "driver:kv", json!({}), None)
            .await;
        assert!(matches!(result, Err(StrataError::Invalid { .. })));
    }

    #[tokio::test]
    async fn grant_to_unknown_holder_is_not_found() {
        let f = fixture();
        let carol = user(&f.store, "carol");

        let result = f
            .engine
            .grant_user_user(&Actor::user(carol), "nobody", "driver:kv", json!({}), None)
            .await;
        assert!(matches!(result, Err(StrataError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cyclic_grants_deny_instead_of_overflowing() {
        let f = fixture();
        let alice = user(&f.store, "alice");
        let bob = user(&f.store, "bob");

        // Neither side has an independent basis; each row's issuer check
        // leads back to the other.
        f.engine
            .grant_user_user(&Actor::user(alice.clone()), "bob", "driver:cycle", json!({}), None)
            .await
            .expect("grant");
        f.engine
            .grant_user_user(&Actor::user(bob.clone()), "alice", "driver:cycle", json!({}), None)
            .await
            .expect("grant");

        assert!(f
            .engine
            .check(&Actor::user(bob), "driver:cycle")
            .await
            .expect("check terminates")
            .is_none());
    }

    #[tokio::test]
    async fn app_cannot_exceed_user_ceiling() {
        let f = fixture();
        let bob = user(&f.store, "bob");
        let app = AppRecord::new(AppId::new(), "editor", None);
        f.store.add_app(app.clone()).expect("add app");

        let app_actor = Actor::app_under_user(bob.clone(), app.clone());

        // bob himself does not hold driver:kv, so the app cannot either,
        // even with an explicit app grant.
        f.engine
            .grant_user_app(&Actor::user(bob.clone()), app.uid, "driver:kv", json!({}), None)
            .await
            .expect("app grant");
        assert!(f
            .engine
            .check(&app_actor, "driver:kv")
            .await
            .expect("check")
            .is_none());

        // Give bob the permission; the app grant now takes effect.
        let carol = user(&f.store, "carol");
        f.engine
            .grant_user_user(&Actor::user(carol), "bob", "driver:kv", json!({}), None)
            .await
            .expect("user grant");
        assert!(f
            .engine
            .check(&app_actor, "driver:kv")
            .await
            .expect("check")
            .is_some());
    }

    #[tokio::test]
    async fn app_needs_its_own_basis_within_the_ceiling() {
        let f = fixture();
        let carol = user(&f.store, "carol");
        let bob = user(&f.store, "bob");
        let app = AppRecord::new(AppId::new(), "editor", None);
        f.store.add_app(app.clone()).expect("add app");

        f.engine
            .grant_user_user(&Actor::user(carol), "bob", "driver:kv", json!({}), None)
            .await
            .expect("user grant");

        // bob holds the permission, but the app has no default, group, or
        // persisted basis of its own.
        let app_actor = Actor::app_under_user(bob, app);
        assert!(f
            .engine
            .check(&app_actor, "driver:kv")
            .await
            .expect("check")
            .is_none());
    }

    #[tokio::test]
    async fn default_app_permissions_apply_with_parent_fallback() {
        use crate::permission::builtins::HelloDriverImplicator;

        let mut registry = PermissionRegistry::new();
        registry.register_implicator(Arc::new(HelloDriverImplicator));
        let f = fixture_with(registry, AuthorizationConfig::default());

        let alice = user(&f.store, "alice");
        let app = AppRecord::new(AppId::new(), "editor", None);
        f.store.add_app(app.clone()).expect("add app");

        // The user ceiling passes via the hello-driver implicator, and
        // the default app permission driver:hello covers the narrower
        // driver:hello:greet by parent fallback.
        let app_actor = Actor::app_under_user(alice, app);
        let granted = f
            .engine
            .check(&app_actor, "driver:hello:greet")
            .await
            .expect("check");
        assert_eq!(granted, Some(json!({})));
    }

    #[tokio::test]
    async fn app_group_permissions_apply() {
        let mut registry = PermissionRegistry::new();
        registry.register_implicator(Arc::new(GrantTo {
            username: "dave",
            permission: "driver:kv",
        }));

        let app_uid = AppId::new();
        let mut config = AuthorizationConfig::default();
        config.implicit_app_groups = vec![strata_core::ImplicitAppGroup {
            name: "first-party".into(),
            apps: vec![app_uid],
            permissions: vec![GrantSpec::bare("driver:kv")],
        }];

        let f = fixture_with(registry, config);
        let dave = user(&f.store, "dave");
        let carol = user(&f.store, "carol");
        let app = AppRecord::new(app_uid, "files", None);
        f.store.add_app(app.clone()).expect("add app");

        // carol's ceiling comes from a persisted grant, so the narrower
        // driver:kv:get is covered by parent fallback on both layers.
        f.engine
            .grant_user_user(&Actor::user(dave), "carol", "driver:kv", json!({}), None)
            .await
            .expect("grant");

        let app_actor = Actor::app_under_user(carol, app);
        let granted = f
            .engine
            .check(&app_actor, "driver:kv:get")
            .await
            .expect("check");
        assert_eq!(granted, Some(json!({})));
    }

    #[tokio::test]
    async fn token_is_scoped_exactly_and_capped() {
        use strata_core::TokenUid;
        use strata_store::{TokenPermissionRow, TokenStore as _};

        let f = fixture();
        let carol = user(&f.store, "carol");
        let bob = user(&f.store, "bob");

        f.engine
            .grant_user_user(&Actor::user(carol.clone()), "bob", "driver:kv", json!({}), None)
            .await
            .expect("grant");

        let token = TokenUid::new();
        f.store
            .insert_token_permissions(
                token,
                vec![TokenPermissionRow {
                    token,
                    permission: "driver:kv:get".into(),
                    extra: json!({}),
                }],
            )
            .await
            .expect("rows");

        let token_actor = Actor::AccessToken(crate::actor::AccessTokenActor {
            authorizer: Box::new(Actor::user(bob)),
            authorized: None,
            token,
        });

        // Exact row + authorizer ceiling: granted.
        assert!(f
            .engine
            .check(&token_actor, "driver:kv:get")
            .await
            .expect("check")
            .is_some());

        // The authorizer holds driver:kv, but the token has no row for
        // driver:kv:put — no parent fallback at the token layer.
        assert!(f
            .engine
            .check(&token_actor, "driver:kv:put")
            .await
            .expect("check")
            .is_none());

        // Revoking the authorizer's own basis lowers the ceiling to zero.
        f.engine
            .revoke_user_user(&Actor::user(carol), "bob", "driver:kv", None)
            .await
            .expect("revoke");
        assert!(f
            .engine
            .check(&token_actor, "driver:kv:get")
            .await
            .expect("check")
            .is_none());
    }

    #[tokio::test]
    async fn mutations_write_audit_rows() {
        use strata_store::AuditStore as _;

        let f = fixture();
        let carol = user(&f.store, "carol");
        user(&f.store, "bob");
        let carol_actor = Actor::user(carol);

        f.engine
            .grant_user_user(
                &carol_actor,
                "bob",
                "driver:kv",
                json!({}),
                Some("sharing kv access".into()),
            )
            .await
            .expect("grant");
        f.engine
            .revoke_user_user(&carol_actor, "bob", "driver:kv", None)
            .await
            .expect("revoke");

        let entries = f.store.entries().await.expect("entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Grant);
        assert_eq!(entries[0].actor_uid, carol_actor.uid());
        assert_eq!(entries[0].reason.as_deref(), Some("sharing kv access"));
        assert_eq!(entries[1].action, AuditAction::Revoke);
    }

    #[tokio::test]
    async fn system_actor_cannot_issue_user_grants() {
        let f = fixture();
        user(&f.store, "bob");

        let result = f
            .engine
            .grant_user_user(&Actor::system(), "bob", "driver:kv", json!({}), None)
            .await;
        assert!(result.is_err());
    }
}
