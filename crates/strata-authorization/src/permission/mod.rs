//! Permission grammar, registry, and decision engine
//!
//! A permission is a string of one or more components joined by `:`,
//! ordered general-to-specific (`driver:<interface>:<method>`,
//! `fs:<node-uid>:<level>`). Components are escaped so they may contain
//! arbitrary text, and a grant for a prefix covers everything beneath it.

pub mod builtins;
pub mod engine;
pub mod grammar;
pub mod registry;

pub use engine::PermissionEngine;
pub use grammar::{
    escape_component, join_permission, parent_permissions, split_permission, unescape_component,
};
pub use registry::{PermissionImplicator, PermissionRegistry, PermissionRewriter};
