//! Persisted row types for the authorization schema
//!
//! These mirror the grant, token, and audit tables owned by the
//! platform's relational store. Rows are value objects; all invariants
//! (idempotent upserts, audit coupling) live in the store traits.

use serde::{Deserialize, Serialize};
use strata_core::{AppId, AuditId, TokenUid, UserId};

/// A user→user grant row
///
/// `holder` was granted `permission` by `issuer`. The grant only remains
/// effective while the issuer still holds the permission themselves; the
/// decision engine re-validates the issuer on every check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGrantRow {
    /// User holding the granted permission
    pub holder: UserId,
    /// User who issued the grant
    pub issuer: UserId,
    /// Permission string as stored (already rewritten)
    pub permission: String,
    /// Extra data returned to callers when this grant matches
    pub extra: serde_json::Value,
}

/// A user→app grant row
///
/// Grants `permission` to `app` when it acts under `user`. The acting
/// user's own permissions remain the ceiling; this row only widens what
/// the app may do within that ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppGrantRow {
    /// User the app acts under (also the grant's issuer)
    pub user: UserId,
    /// App receiving the permission
    pub app: AppId,
    /// Permission string as stored (already rewritten)
    pub permission: String,
    /// Extra data returned to callers when this grant matches
    pub extra: serde_json::Value,
}

/// A scoped permission row belonging to one access token
///
/// The full row set for a token is written atomically at issuance and
/// only ever removed as a whole (revocation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPermissionRow {
    /// Token this row belongs to
    pub token: TokenUid,
    /// Exact permission string the token was scoped to
    pub permission: String,
    /// Extra data returned to callers when this row matches
    pub extra: serde_json::Value,
}

/// Action recorded by an audit row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A grant row was written or updated
    Grant,
    /// A grant row was removed
    Revoke,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Grant => write!(f, "grant"),
            AuditAction::Revoke => write!(f, "revoke"),
        }
    }
}

/// One immutable audit row
///
/// Appended alongside every grant/revoke mutation. Rows are never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row identifier
    pub id: AuditId,
    /// Uid of the actor who performed the mutation
    pub actor_uid: String,
    /// What happened
    pub action: AuditAction,
    /// Permission the mutation concerned (as stored)
    pub permission: String,
    /// Uid of the holder side of the mutation (user or app)
    pub target_uid: String,
    /// Reason supplied by the caller, if any
    pub reason: Option<String>,
    /// Unix timestamp (seconds) of the mutation
    pub at: i64,
}

impl AuditEntry {
    /// Create an audit row stamped with the current time
    pub fn record(
        actor_uid: impl Into<String>,
        action: AuditAction,
        permission: impl Into<String>,
        target_uid: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: AuditId::new(),
            actor_uid: actor_uid.into(),
            action,
            permission: permission.into(),
            target_uid: target_uid.into(),
            reason,
            at: time::OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}
