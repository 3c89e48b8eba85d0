//! Core identifier types used across the Strata platform
//!
//! This module provides the fundamental identifier types that uniquely
//! identify the entities the authorization core reasons about: users,
//! apps, filesystem nodes, access tokens, sessions, and audit rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// User identifier
    ///
    /// Uniquely identifies a platform tenant. Used as the holder/issuer key
    /// in grant tables and as the identity component of user actor uids.
    UserId,
    "user"
);

define_id!(
    /// Application identifier
    ///
    /// Uniquely identifies a registered application. Apps never act on
    /// their own; they always act under a user.
    AppId,
    "app"
);

define_id!(
    /// Filesystem node identifier
    ///
    /// Identifies one node in the filesystem tree independent of its path,
    /// so permissions survive renames and moves.
    NodeId,
    "node"
);

define_id!(
    /// Access token identifier
    ///
    /// Keys the persisted scoped-permission rows of one delegation token.
    TokenUid,
    "token"
);

define_id!(
    /// Session identifier for authenticated user sessions
    SessionId,
    "session"
);

define_id!(
    /// Audit row identifier
    AuditId,
    "audit"
);
