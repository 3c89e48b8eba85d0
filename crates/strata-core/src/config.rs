//! Boot-time configuration for the authorization core
//!
//! The authorization core carries no ambient global state: everything a
//! deployment tunes — the secret key behind opaque actor identifiers, the
//! recursion budget for delegation re-checks, and the implicit app
//! permission tables — is assembled into one [`AuthorizationConfig`] at
//! boot and passed by reference into the engines.

use crate::errors::{StrataError, StrataResult};
use crate::identifiers::AppId;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// A permission paired with its grant payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantSpec {
    /// Permission string, general-to-specific components joined by `:`
    pub permission: String,
    /// Extra data returned to callers when this grant matches
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl GrantSpec {
    /// A grant with an empty extra payload
    pub fn bare(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            extra: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// A named group of apps that share an implicit permission set
///
/// Apps are enumerated by uid; membership grants every permission in the
/// set (with parent fallback) to the app when acting under any user,
/// still capped by that user's own permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitAppGroup {
    /// Group name, used only for logging and diagnostics
    pub name: String,
    /// Member app uids
    pub apps: Vec<AppId>,
    /// Permissions every member app holds implicitly
    pub permissions: Vec<GrantSpec>,
}

/// Configuration for the authorization core, assembled once at boot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Secret key for the keyed one-way `private_uid` derivation
    pub private_uid_key: Vec<u8>,
    /// Maximum recursion depth for issuer and delegation re-checks;
    /// exceeding the budget denies instead of recursing further
    pub max_check_depth: usize,
    /// Interface-level permissions every app holds by default
    /// (still capped by the acting user's own permissions)
    pub default_app_permissions: Vec<GrantSpec>,
    /// Named app groups with implicit permission sets
    pub implicit_app_groups: Vec<ImplicitAppGroup>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        let mut key = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self {
            private_uid_key: key,
            max_check_depth: 16,
            default_app_permissions: vec![GrantSpec::bare("driver:hello")],
            implicit_app_groups: Vec::new(),
        }
    }
}

impl AuthorizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> StrataResult<()> {
        if self.private_uid_key.is_empty() {
            return Err(StrataError::invalid("private_uid_key must not be empty"));
        }
        if self.max_check_depth == 0 {
            return Err(StrataError::invalid(
                "max_check_depth must be at least 1 for delegation re-checks",
            ));
        }
        for group in &self.implicit_app_groups {
            if group.name.is_empty() {
                return Err(StrataError::invalid("implicit app group has empty name"));
            }
        }
        Ok(())
    }
}
