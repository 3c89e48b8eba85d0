//! Repository traits consumed by the authorization core
//!
//! All reads the decision engine performs go through these seams, so the
//! engine itself holds no shared mutable state. Implementations must be
//! `Send + Sync`; the engine issues fully concurrent checks.
//!
//! Grant queries take a bound slice of permission strings and match rows
//! whose permission is *any* element — the "any of these parent
//! permissions" semantics — so implementations bind the list as an array
//! parameter rather than assembling filter strings.

use crate::rows::{AppGrantRow, AuditEntry, TokenPermissionRow, UserGrantRow};
use async_trait::async_trait;
use strata_core::{AppId, AppRecord, NodeId, NodeRecord, StrataResult, TokenUid, UserId, UserRecord};

/// Identity lookup: users and apps by their stable keys
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up a user by id
    async fn user_by_id(&self, id: UserId) -> StrataResult<Option<UserRecord>>;

    /// Look up a user by username
    async fn user_by_username(&self, username: &str) -> StrataResult<Option<UserRecord>>;

    /// Look up an app by uid
    async fn app_by_uid(&self, uid: AppId) -> StrataResult<Option<AppRecord>>;
}

/// Grant tables: user→user and user→app rows
///
/// Mutations carry their audit row and implementations must apply both
/// writes in one logical transaction: a stored grant without its audit
/// row (or the reverse) is a contract violation.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Rows where `holder` holds any permission in `permissions`
    async fn user_grants_for(
        &self,
        holder: UserId,
        permissions: &[String],
    ) -> StrataResult<Vec<UserGrantRow>>;

    /// Write or update a user→user grant row
    ///
    /// Idempotent on `(holder, issuer, permission)`: re-granting updates
    /// `extra` rather than duplicating the row.
    async fn upsert_user_grant(&self, row: UserGrantRow, audit: AuditEntry) -> StrataResult<()>;

    /// Remove a user→user grant row (no-op if absent)
    async fn delete_user_grant(
        &self,
        holder: UserId,
        issuer: UserId,
        permission: &str,
        audit: AuditEntry,
    ) -> StrataResult<()>;

    /// Rows where `app` under `user` holds any permission in `permissions`
    async fn app_grants_for(
        &self,
        user: UserId,
        app: AppId,
        permissions: &[String],
    ) -> StrataResult<Vec<AppGrantRow>>;

    /// Write or update a user→app grant row
    ///
    /// Idempotent on `(user, app, permission)`.
    async fn upsert_app_grant(&self, row: AppGrantRow, audit: AuditEntry) -> StrataResult<()>;

    /// Remove a user→app grant row (no-op if absent)
    async fn delete_app_grant(
        &self,
        user: UserId,
        app: AppId,
        permission: &str,
        audit: AuditEntry,
    ) -> StrataResult<()>;
}

/// Access-token permission rows
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist the full row set of a freshly issued token atomically
    async fn insert_token_permissions(
        &self,
        token: TokenUid,
        rows: Vec<TokenPermissionRow>,
    ) -> StrataResult<()>;

    /// Exact-match lookup of one token permission row
    ///
    /// No parent fallback happens here: tokens are scoped to exactly what
    /// was granted at issuance.
    async fn token_permission(
        &self,
        token: TokenUid,
        permission: &str,
    ) -> StrataResult<Option<serde_json::Value>>;

    /// Discard a token's entire row set, revoking it
    async fn delete_token(&self, token: TokenUid) -> StrataResult<()>;
}

/// Append-only audit trail
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one audit row
    async fn append(&self, entry: AuditEntry) -> StrataResult<()>;

    /// All audit rows in append order
    async fn entries(&self) -> StrataResult<Vec<AuditEntry>>;
}

/// Filesystem node hierarchy
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Look up a node by uid
    async fn node_by_uid(&self, uid: NodeId) -> StrataResult<Option<NodeRecord>>;

    /// Look up a node by absolute path
    async fn node_by_path(&self, path: &str) -> StrataResult<Option<NodeRecord>>;

    /// The node's parent, or `None` for the root
    async fn parent_of(&self, node: &NodeRecord) -> StrataResult<Option<NodeRecord>>;
}
