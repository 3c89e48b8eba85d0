//! Built-in implicators contributed by platform subsystems at boot
//!
//! Each subsystem owns one structural rule: the app subsystem grants app
//! owners access to their own apps, the filesystem grants every user
//! their own home tree, and the demo driver is open to every tenant.
//! Deployments register these alongside their own implicators.

use crate::actor::Actor;
use crate::permission::grammar::split_permission;
use crate::permission::registry::PermissionImplicator;
use async_trait::async_trait;
use std::sync::Arc;
use strata_core::{AppId, NodeId, StrataResult};
use strata_store::{IdentityStore, NodeStore};
use uuid::Uuid;

/// "The owner of an app may always use it"
///
/// Matches `app:<app-uid>:…` permissions and grants them to the user who
/// registered the app, without any persisted row.
pub struct AppOwnerImplicator {
    identity: Arc<dyn IdentityStore>,
}

impl AppOwnerImplicator {
    /// Create the implicator over the identity seam
    pub fn new(identity: Arc<dyn IdentityStore>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl PermissionImplicator for AppOwnerImplicator {
    fn id(&self) -> &str {
        "app-owner"
    }

    fn matches(&self, permission: &str) -> bool {
        let components = split_permission(permission);
        components.len() >= 2 && components[0] == "app"
    }

    async fn check(
        &self,
        actor: &Actor,
        permission: &str,
    ) -> StrataResult<Option<serde_json::Value>> {
        let Ok(user_actor) = actor.related_user() else {
            return Ok(None);
        };

        let components = split_permission(permission);
        // Second component is the app uid; a non-uuid value simply means
        // the permission refers to an app this rule cannot resolve.
        let Ok(uuid) = Uuid::parse_str(&components[1]) else {
            return Ok(None);
        };
        let Some(app) = self.identity.app_by_uid(AppId::from_uuid(uuid)).await? else {
            return Ok(None);
        };

        if app.owner == Some(user_actor.user.id) {
            tracing::debug!(
                app = %app.uid,
                user = %user_actor.user.id,
                "app owner granted implicit access"
            );
            return Ok(Some(serde_json::json!({})));
        }
        Ok(None)
    }
}

/// "A user owns everything under their home directory"
///
/// Matches `fs:<node-uid>:<level>` permissions and grants every access
/// level on nodes at or below `/<username>`. This is the root basis for
/// filesystem sharing: delegated fs grants re-validate against the
/// issuer, and the chain grounds out here for the owner.
pub struct FsOwnerImplicator {
    nodes: Arc<dyn NodeStore>,
}

impl FsOwnerImplicator {
    /// Create the implicator over the node-hierarchy seam
    pub fn new(nodes: Arc<dyn NodeStore>) -> Self {
        Self { nodes }
    }
}

#[async_trait]
impl PermissionImplicator for FsOwnerImplicator {
    fn id(&self) -> &str {
        "fs-owner"
    }

    fn matches(&self, permission: &str) -> bool {
        let components = split_permission(permission);
        components.len() >= 3 && components[0] == "fs"
    }

    async fn check(
        &self,
        actor: &Actor,
        permission: &str,
    ) -> StrataResult<Option<serde_json::Value>> {
        let Ok(user_actor) = actor.related_user() else {
            return Ok(None);
        };

        let components = split_permission(permission);
        let Ok(uuid) = Uuid::parse_str(&components[1]) else {
            return Ok(None);
        };
        let Some(node) = self.nodes.node_by_uid(NodeId::from_uuid(uuid)).await? else {
            return Ok(None);
        };

        let home = format!("/{}", user_actor.user.username);
        if node.path == home || node.path.starts_with(&format!("{home}/")) {
            tracing::debug!(
                node = %node.uid,
                user = %user_actor.user.id,
                "home-directory owner granted implicit access"
            );
            return Ok(Some(serde_json::json!({})));
        }
        Ok(None)
    }
}

/// Default access to the demo driver for every tenant
pub struct HelloDriverImplicator;

#[async_trait]
impl PermissionImplicator for HelloDriverImplicator {
    fn id(&self) -> &str {
        "hello-driver"
    }

    fn matches(&self, permission: &str) -> bool {
        let components = split_permission(permission);
        components.len() >= 2 && components[0] == "driver" && components[1] == "hello"
    }

    async fn check(
        &self,
        actor: &Actor,
        _permission: &str,
    ) -> StrataResult<Option<serde_json::Value>> {
        if actor.related_user().is_ok() {
            return Ok(Some(serde_json::json!({})));
        }
        Ok(None)
    }
}
