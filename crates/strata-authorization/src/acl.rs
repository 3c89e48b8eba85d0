//! Filesystem access-control layer
//!
//! Translates a filesystem node plus an access level into permission
//! checks against the decision engine, walking the node's ancestor chain
//! so a grant anywhere above a node covers everything beneath it.
//!
//! Levels escalate: `write ⊃ read ⊃ list ⊃ see`. Holding a higher level
//! implies every lower one, so a request for `list` is satisfied by a
//! grant of `fs:<uid>:list`, `:read`, or `:write` at any ancestor.

use crate::actor::Actor;
use crate::permission::engine::PermissionEngine;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use strata_core::{NodeRecord, StrataError, StrataResult};
use strata_store::NodeStore;

/// Access level requested on a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    /// Know the node exists
    See = 0,
    /// Enumerate children
    List = 1,
    /// Read content
    Read = 2,
    /// Modify content or children
    Write = 3,
}

const ALL_LEVELS: [AccessLevel; 4] = [
    AccessLevel::See,
    AccessLevel::List,
    AccessLevel::Read,
    AccessLevel::Write,
];

impl AccessLevel {
    /// Permission-component spelling of this level
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::See => "see",
            AccessLevel::List => "list",
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
        }
    }

    /// Levels whose grant satisfies a request for this level
    ///
    /// The requested level itself plus everything above it.
    pub fn at_or_above(&self) -> &'static [AccessLevel] {
        &ALL_LEVELS[*self as usize..]
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type AclFuture<'a> = Pin<Box<dyn Future<Output = StrataResult<bool>> + Send + 'a>>;

/// The filesystem ACL engine
pub struct AclEngine {
    nodes: Arc<dyn NodeStore>,
    permissions: Arc<PermissionEngine>,
}

impl AclEngine {
    /// Create an ACL engine over the node seam and the decision engine
    pub fn new(nodes: Arc<dyn NodeStore>, permissions: Arc<PermissionEngine>) -> Self {
        Self { nodes, permissions }
    }

    /// May `actor` access `node` at `level`?
    pub async fn check(
        &self,
        actor: &Actor,
        node: &NodeRecord,
        level: AccessLevel,
    ) -> StrataResult<bool> {
        self.check_inner(actor, node, level).await
    }

    fn check_inner<'a>(
        &'a self,
        actor: &'a Actor,
        node: &'a NodeRecord,
        level: AccessLevel,
    ) -> AclFuture<'a> {
        Box::pin(async move {
            if matches!(actor, Actor::System) {
                return Ok(true);
            }

            // The root is visible to everyone and writable by no one.
            if node.is_root() {
                return Ok(level < AccessLevel::Write);
            }

            match actor {
                Actor::AccessToken(token_actor) => {
                    // The token's ceiling is its authorizer's access.
                    if !self
                        .check_inner(&token_actor.authorizer, node, level)
                        .await?
                    {
                        tracing::debug!(
                            node = %node.uid,
                            level = %level,
                            "token authorizer failed acl check"
                        );
                        return Ok(false);
                    }
                }
                Actor::AppUnderUser(app_actor) => {
                    if self.in_app_sandbox(app_actor, node) {
                        tracing::debug!(
                            node = %node.uid,
                            app = %app_actor.app.uid,
                            "sandbox carve-out granted"
                        );
                        return Ok(true);
                    }
                    // Outside its sandbox the app is capped by its user.
                    let user_actor = Actor::User(actor.related_user()?);
                    if !self.check_inner(&user_actor, node, level).await? {
                        return Ok(false);
                    }
                }
                _ => {}
            }

            self.walk_ancestors(actor, node, level).await
        })
    }

    /// Unconditional access to the app's own per-user data directory
    fn in_app_sandbox(
        &self,
        app_actor: &crate::actor::AppUnderUserActor,
        node: &NodeRecord,
    ) -> bool {
        let sandbox = format!(
            "/{}/AppData/{}",
            app_actor.user.username,
            app_actor.app.uid.uuid()
        );
        node.path == sandbox || node.path.starts_with(&format!("{sandbox}/"))
    }

    async fn walk_ancestors(
        &self,
        actor: &Actor,
        node: &NodeRecord,
        level: AccessLevel,
    ) -> StrataResult<bool> {
        let mut current = node.clone();
        loop {
            for satisfying in level.at_or_above() {
                let permission = format!("fs:{}:{}", current.uid.uuid(), satisfying);
                if self.permissions.check(actor, &permission).await?.is_some() {
                    tracing::debug!(
                        actor = %actor.uid(),
                        node = %current.uid,
                        level = %satisfying,
                        "acl granted"
                    );
                    return Ok(true);
                }
            }
            match self.nodes.parent_of(&current).await? {
                Some(parent) => current = parent,
                None => break,
            }
        }
        tracing::debug!(actor = %actor.uid(), node = %node.uid, level = %level, "acl denied");
        Ok(false)
    }

    /// The error a denied request should surface
    ///
    /// Reports "not found" instead of "permission denied" whenever the
    /// actor cannot even `see` the node, so a denial never confirms the
    /// resource exists.
    pub async fn denial_error(
        &self,
        actor: &Actor,
        node: &NodeRecord,
        level: AccessLevel,
    ) -> StrataResult<StrataError> {
        if !self.check(actor, node, AccessLevel::See).await? {
            return Ok(StrataError::not_found("subject does not exist"));
        }
        Ok(StrataError::permission_denied(format!(
            "{level} access to {} denied",
            node.path
        )))
    }
}

impl std::fmt::Debug for AclEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclEngine").finish_non_exhaustive()
    }
}
