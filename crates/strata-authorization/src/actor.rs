//! Actor model: who is asking
//!
//! Represents the four identities the platform recognizes as one closed
//! sum type so the decision engine can match exhaustively:
//!
//! - **System**: the platform itself; absolute trust, passes every check
//! - **User**: a tenant acting through an authenticated session
//! - **AppUnderUser**: an application acting on behalf of a user
//! - **AccessToken**: a delegated identity whose ceiling is its
//!   authorizer's current permissions
//!
//! Actors are immutable value objects constructed per call by the
//! authentication collaborator at the system boundary. Nothing in this
//! core reaches into ambient request context; every public API takes an
//! `Actor` argument.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use strata_core::{AppRecord, SessionId, StrataError, StrataResult, TokenUid, UserRecord};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// A user acting through an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActor {
    /// The acting user
    pub user: UserRecord,
    /// Session the actor was constructed from, if any
    pub session: Option<SessionId>,
}

/// An application acting on behalf of a user
///
/// The app's effective permissions are always capped by the user's own;
/// the decision engine enforces the ceiling before consulting any
/// app-level grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUnderUserActor {
    /// The user the app acts under
    pub user: UserRecord,
    /// The acting app
    pub app: AppRecord,
}

/// A delegated identity backed by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenActor {
    /// The actor that issued the token; its current permissions are the
    /// token's ceiling
    pub authorizer: Box<Actor>,
    /// The actor the token was handed to, when known
    pub authorized: Option<Box<Actor>>,
    /// The token's stable identifier
    pub token: TokenUid,
}

/// The identity performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// The platform itself. Only constructed internally from system
    /// context; never derived from untrusted input.
    System,
    /// A tenant
    User(UserActor),
    /// An app acting on behalf of a user
    AppUnderUser(AppUnderUserActor),
    /// A delegated token identity
    AccessToken(AccessTokenActor),
}

impl Actor {
    /// The system actor (internal trust boundary)
    pub fn system() -> Self {
        Actor::System
    }

    /// A user actor without session context
    pub fn user(user: UserRecord) -> Self {
        Actor::User(UserActor {
            user,
            session: None,
        })
    }

    /// A user actor carrying its session
    pub fn user_with_session(user: UserRecord, session: SessionId) -> Self {
        Actor::User(UserActor {
            user,
            session: Some(session),
        })
    }

    /// An app acting under a user
    pub fn app_under_user(user: UserRecord, app: AppRecord) -> Self {
        Actor::AppUnderUser(AppUnderUserActor { user, app })
    }

    /// Variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Actor::System => "system",
            Actor::User(_) => "user",
            Actor::AppUnderUser(_) => "app-under-user",
            Actor::AccessToken(_) => "access-token",
        }
    }

    /// Stable, collision-resistant identity string
    ///
    /// Derived purely from the variant's identifying fields; used as a
    /// grant key, cache key, and audit key.
    pub fn uid(&self) -> String {
        match self {
            Actor::System => "system".to_string(),
            Actor::User(actor) => format!("user:{}", actor.user.id.uuid()),
            Actor::AppUnderUser(actor) => format!(
                "app-under-user:{}:{}",
                actor.user.id.uuid(),
                actor.app.uid.uuid()
            ),
            Actor::AccessToken(actor) => {
                let authorized = actor
                    .authorized
                    .as_ref()
                    .map(|a| a.uid())
                    .unwrap_or_else(|| "none".to_string());
                format!(
                    "access-token:{}:{}:{}",
                    actor.authorizer.uid(),
                    authorized,
                    actor.token.uuid()
                )
            }
        }
    }

    /// Project this actor onto its user
    ///
    /// Defined for user and app-under-user actors. Fails for the system
    /// actor (no user) and for access tokens, where the projection is
    /// ambiguous between authorizer and authorized.
    pub fn related_user(&self) -> StrataResult<UserActor> {
        match self {
            Actor::User(actor) => Ok(actor.clone()),
            Actor::AppUnderUser(actor) => Ok(UserActor {
                user: actor.user.clone(),
                session: None,
            }),
            Actor::System => Err(StrataError::invalid(
                "system actor has no user projection",
            )),
            Actor::AccessToken(_) => Err(StrataError::invalid(
                "access-token actor has no unambiguous user projection",
            )),
        }
    }

    /// Keyed one-way derivation of [`Actor::uid`], UUID-formatted
    ///
    /// Deterministic per actor and key; shared with external systems
    /// where an opaque per-actor identifier is needed without revealing
    /// the real uid. Not invertible without the key.
    pub fn private_uid(&self, key: &[u8]) -> StrataResult<String> {
        // HMAC itself accepts empty keys; an empty key here is always a
        // configuration mistake.
        if key.is_empty() {
            return Err(StrataError::crypto("private_uid key must not be empty"));
        }
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|_| StrataError::crypto("invalid private_uid key"))?;
        mac.update(self.uid().as_bytes());
        let digest = mac.finalize().into_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes.copy_from_slice(&digest[..16]);
        Ok(Uuid::from_bytes(uuid_bytes).to_string())
    }
}

impl From<UserRecord> for Actor {
    fn from(user: UserRecord) -> Self {
        Actor::user(user)
    }
}

impl From<UserActor> for Actor {
    fn from(actor: UserActor) -> Self {
        Actor::User(actor)
    }
}

impl From<AppUnderUserActor> for Actor {
    fn from(actor: AppUnderUserActor) -> Self {
        Actor::AppUnderUser(actor)
    }
}

impl From<AccessTokenActor> for Actor {
    fn from(actor: AccessTokenActor) -> Self {
        Actor::AccessToken(actor)
    }
}
