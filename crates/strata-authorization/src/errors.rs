//! Authorization error handling using the unified error system
//!
//! Uses the unified `StrataError` from strata-core for consistency across
//! crates. Permission denial never surfaces through this type; see the
//! crate docs for the denial-as-value convention.

pub use strata_core::{StrataError, StrataResult};
