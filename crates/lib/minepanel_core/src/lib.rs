//! # minepanel_core
//!
//! Core domain logic for MinePanel: roles, credentials, identity and audit
//! storage, and the command policy filter.

pub mod audit;
pub mod auth;
pub mod db;
pub mod migrate;
pub mod models;
pub mod policy;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
