//! Strata Authorization - Who May Do What
//!
//! This crate is the authorization core of the Strata platform. Every
//! other subsystem — file operations, pluggable drivers, sharing, app
//! sandboxing — asks one question here: may actor A perform permission P?
//!
//! # Architecture
//!
//! ```text
//! callers (request handlers, drivers, sharing, ...)
//!     │
//!     ├── AclEngine          filesystem node + access level → permission
//!     │       │              checks along the node's ancestor chain
//!     │       ▼
//!     ├── PermissionEngine   per-variant decision algorithm: implicit
//!     │       │              tables, implicators, persisted grants,
//!     │       │              delegation ceilings, issuer re-validation
//!     │       ▼
//!     └── stores (strata-store seams: grants, tokens, audit, identity,
//!                 node hierarchy)
//! ```
//!
//! # Key pieces
//!
//! - [`Actor`]: closed sum type over the four identities the platform
//!   recognizes (system, user, app-under-user, access token)
//! - [`permission::grammar`]: the colon-delimited, component-escaped
//!   permission string grammar with hierarchical prefixes
//! - [`PermissionRegistry`]: rewriters (canonicalization) and implicators
//!   (computed grants) registered once at boot
//! - [`PermissionEngine`]: the decision algorithm plus grant/revoke
//!   mutations with a coupled audit trail
//! - [`AclEngine`]: the filesystem access-control layer built on top
//! - [`AccessTokenService`]: issuance and revocation of scoped,
//!   revocable delegation tokens
//!
//! Denial is a value, not an error: checks return `Ok(None)` / `Ok(false)`
//! when no grant covers the request. Errors signal structural problems.

#![forbid(unsafe_code)]

/// Actor model: who is asking
pub mod actor;

/// Permission grammar, registry, and decision engine
pub mod permission;

/// Filesystem access-control layer
pub mod acl;

/// Access-token delegation
pub mod token;

/// Audit trail querying
pub mod audit;

/// Unified error handling re-exports
pub mod errors;

pub use acl::{AccessLevel, AclEngine};
pub use actor::{AccessTokenActor, Actor, AppUnderUserActor, UserActor};
pub use audit::AuditQuery;
pub use errors::{StrataError, StrataResult};
pub use permission::engine::PermissionEngine;
pub use permission::registry::{PermissionImplicator, PermissionRegistry, PermissionRewriter};
pub use token::AccessTokenService;
