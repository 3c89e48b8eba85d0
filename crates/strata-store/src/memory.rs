//! In-memory store implementation
//!
//! Backs every repository trait with one `RwLock`-guarded table set, so
//! each trait call is atomic with respect to every other — in particular
//! a grant mutation and its audit row land together or not at all.
//!
//! Production deployments put the relational backend behind the same
//! traits; this implementation serves bootstrap, simulation, and tests.

use crate::rows::{AppGrantRow, AuditEntry, TokenPermissionRow, UserGrantRow};
use crate::traits::{AuditStore, GrantStore, IdentityStore, NodeStore, TokenStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use strata_core::{
    AppId, AppRecord, NodeId, NodeRecord, StrataError, StrataResult, TokenUid, UserId, UserRecord,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, UserRecord>,
    apps: HashMap<AppId, AppRecord>,
    nodes: HashMap<NodeId, NodeRecord>,
    user_grants: Vec<UserGrantRow>,
    app_grants: Vec<AppGrantRow>,
    token_rows: Vec<TokenPermissionRow>,
    audit: Vec<AuditEntry>,
}

/// In-memory implementation of every store seam
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StrataResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| StrataError::internal("memory store lock poisoned"))
    }

    fn write(&self) -> StrataResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| StrataError::internal("memory store lock poisoned"))
    }

    /// Register a user (bootstrap surface)
    pub fn add_user(&self, user: UserRecord) -> StrataResult<()> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    /// Register an app (bootstrap surface)
    pub fn add_app(&self, app: AppRecord) -> StrataResult<()> {
        self.write()?.apps.insert(app.uid, app);
        Ok(())
    }

    /// Register a filesystem node (bootstrap surface)
    pub fn add_node(&self, node: NodeRecord) -> StrataResult<()> {
        self.write()?.nodes.insert(node.uid, node);
        Ok(())
    }

    /// Flip a user's suspension flag
    pub fn set_user_suspended(&self, id: UserId, suspended: bool) -> StrataResult<()> {
        let mut state = self.write()?;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StrataError::not_found(format!("user {id}")))?;
        user.suspended = suspended;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn user_by_id(&self, id: UserId) -> StrataResult<Option<UserRecord>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StrataResult<Option<UserRecord>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn app_by_uid(&self, uid: AppId) -> StrataResult<Option<AppRecord>> {
        Ok(self.read()?.apps.get(&uid).cloned())
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn user_grants_for(
        &self,
        holder: UserId,
        permissions: &[String],
    ) -> StrataResult<Vec<UserGrantRow>> {
        Ok(self
            .read()?
            .user_grants
            .iter()
            .filter(|row| row.holder == holder && permissions.contains(&row.permission))
            .cloned()
            .collect())
    }

    async fn upsert_user_grant(&self, row: UserGrantRow, audit: AuditEntry) -> StrataResult<()> {
        let mut state = self.write()?;
        match state.user_grants.iter_mut().find(|existing| {
            existing.holder == row.holder
                && existing.issuer == row.issuer
                && existing.permission == row.permission
        }) {
            Some(existing) => existing.extra = row.extra,
            None => state.user_grants.push(row),
        }
        state.audit.push(audit);
        Ok(())
    }

    async fn delete_user_grant(
        &self,
        holder: UserId,
        issuer: UserId,
        permission: &str,
        audit: AuditEntry,
    ) -> StrataResult<()> {
        let mut state = self.write()?;
        state.user_grants.retain(|row| {
            !(row.holder == holder && row.issuer == issuer && row.permission == permission)
        });
        state.audit.push(audit);
        Ok(())
    }

    async fn app_grants_for(
        &self,
        user: UserId,
        app: AppId,
        permissions: &[String],
    ) -> StrataResult<Vec<AppGrantRow>> {
        Ok(self
            .read()?
            .app_grants
            .iter()
            .filter(|row| {
                row.user == user && row.app == app && permissions.contains(&row.permission)
            })
            .cloned()
            .collect())
    }

    async fn upsert_app_grant(&self, row: AppGrantRow, audit: AuditEntry) -> StrataResult<()> {
        let mut state = self.write()?;
        match state.app_grants.iter_mut().find(|existing| {
            existing.user == row.user
                && existing.app == row.app
                && existing.permission == row.permission
        }) {
            Some(existing) => existing.extra = row.extra,
            None => state.app_grants.push(row),
        }
        state.audit.push(audit);
        Ok(())
    }

    async fn delete_app_grant(
        &self,
        user: UserId,
        app: AppId,
        permission: &str,
        audit: AuditEntry,
    ) -> StrataResult<()> {
        let mut state = self.write()?;
        state
            .app_grants
            .retain(|row| !(row.user == user && row.app == app && row.permission == permission));
        state.audit.push(audit);
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token_permissions(
        &self,
        token: TokenUid,
        rows: Vec<TokenPermissionRow>,
    ) -> StrataResult<()> {
        for row in &rows {
            if row.token != token {
                return Err(StrataError::invalid(format!(
                    "token row belongs to {} but was inserted under {token}",
                    row.token
                )));
            }
        }
        self.write()?.token_rows.extend(rows);
        Ok(())
    }

    async fn token_permission(
        &self,
        token: TokenUid,
        permission: &str,
    ) -> StrataResult<Option<serde_json::Value>> {
        Ok(self
            .read()?
            .token_rows
            .iter()
            .find(|row| row.token == token && row.permission == permission)
            .map(|row| row.extra.clone()))
    }

    async fn delete_token(&self, token: TokenUid) -> StrataResult<()> {
        self.write()?.token_rows.retain(|row| row.token != token);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: AuditEntry) -> StrataResult<()> {
        self.write()?.audit.push(entry);
        Ok(())
    }

    async fn entries(&self) -> StrataResult<Vec<AuditEntry>> {
        Ok(self.read()?.audit.clone())
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn node_by_uid(&self, uid: NodeId) -> StrataResult<Option<NodeRecord>> {
        Ok(self.read()?.nodes.get(&uid).cloned())
    }

    async fn node_by_path(&self, path: &str) -> StrataResult<Option<NodeRecord>> {
        Ok(self
            .read()?
            .nodes
            .values()
            .find(|node| node.path == path)
            .cloned())
    }

    async fn parent_of(&self, node: &NodeRecord) -> StrataResult<Option<NodeRecord>> {
        let Some(parent_uid) = node.parent else {
            return Ok(None);
        };
        self.read()?
            .nodes
            .get(&parent_uid)
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                StrataError::storage(format!(
                    "node {} references missing parent {parent_uid}",
                    node.uid
                ))
            })
    }
}
