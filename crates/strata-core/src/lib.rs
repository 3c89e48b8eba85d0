//! Strata Core - Platform Foundation
//!
//! This crate provides the foundational types shared by every Strata
//! subsystem. It contains only value objects and pure helpers with no
//! storage or protocol logic:
//!
//! - Identifier newtypes for users, apps, filesystem nodes, tokens,
//!   sessions, and audit rows
//! - Entity records (`UserRecord`, `AppRecord`, `NodeRecord`)
//! - The unified error type (`StrataError`) used across all crates
//! - Authorization configuration assembled once at boot

#![forbid(unsafe_code)]

/// User, app, node, token, session, and audit identifiers
pub mod identifiers;

/// Entity value objects persisted by the platform's relational store
pub mod entities;

/// Unified error handling
pub mod errors;

/// Boot-time configuration for the authorization core
pub mod config;

pub use config::{AuthorizationConfig, GrantSpec, ImplicitAppGroup};
pub use entities::{AppRecord, NodeRecord, UserRecord};
pub use errors::{StrataError, StrataResult};
pub use identifiers::{AppId, AuditId, NodeId, SessionId, TokenUid, UserId};
