//! Entity value objects for users, apps, and filesystem nodes
//!
//! These records mirror rows owned by the platform's relational store.
//! The authorization core receives them fully formed and never mutates
//! them; identity lookup happens through the store seam in `strata-store`.

use crate::identifiers::{AppId, NodeId, UserId};
use serde::{Deserialize, Serialize};

/// A platform user (tenant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable user identifier
    pub id: UserId,
    /// Login name, unique across the platform
    pub username: String,
    /// Suspended users hold no permissions until reinstated
    pub suspended: bool,
}

impl UserRecord {
    /// Create an active user record
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            suspended: false,
        }
    }
}

/// A registered application
///
/// Apps never act on their own authority; every app operation happens
/// under some user, and the app's effective permissions are capped by
/// that user's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Stable app identifier
    pub uid: AppId,
    /// Human-readable app name
    pub name: String,
    /// The user who registered the app, if any
    pub owner: Option<UserId>,
}

impl AppRecord {
    /// Create an app record
    pub fn new(uid: AppId, name: impl Into<String>, owner: Option<UserId>) -> Self {
        Self {
            uid,
            name: name.into(),
            owner,
        }
    }
}

/// One node in the filesystem tree
///
/// Nodes carry their absolute path for sandbox-prefix decisions, but
/// identity (and therefore permissions) is keyed by `uid` so grants
/// survive renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable node identifier
    pub uid: NodeId,
    /// Absolute path, `/` for the root
    pub path: String,
    /// Parent node; `None` only for the root
    pub parent: Option<NodeId>,
}

impl NodeRecord {
    /// Create a node record
    pub fn new(uid: NodeId, path: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            uid,
            path: path.into(),
            parent,
        }
    }

    /// The filesystem root is the only node without a parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
