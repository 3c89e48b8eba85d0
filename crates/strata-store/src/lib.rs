//! Strata Store - Persistence Seam
//!
//! Repository traits for everything the authorization core persists or
//! looks up, plus the in-memory implementation used for bootstrap and
//! tests:
//!
//! - **Identity lookup**: users by id/username, apps by uid
//! - **Grant tables**: user→user and user→app grant rows with an `extra`
//!   JSON column, queried by bound permission lists
//! - **Access-token rows**: `(token_uid, permission, extra)` sets created
//!   atomically at issuance
//! - **Audit rows**: append-only grant/revoke trail, coupled to the grant
//!   write in one store call
//! - **Node hierarchy**: filesystem nodes and their ancestor chain
//!
//! The relational backend that production deployments use implements the
//! same traits in its own crate; only [`MemoryStore`] lives here.

#![forbid(unsafe_code)]

/// Persisted row types (grant tables, token rows, audit trail)
pub mod rows;

/// Repository traits consumed by the authorization core
pub mod traits;

/// In-memory store implementation
pub mod memory;

pub use memory::MemoryStore;
pub use rows::{AppGrantRow, AuditAction, AuditEntry, TokenPermissionRow, UserGrantRow};
pub use traits::{AuditStore, GrantStore, IdentityStore, NodeStore, TokenStore};
