//! Netmusic Core: shared errors, configuration, and utilities.
//!
//! This crate provides the foundational types used across all Netmusic
//! crates. It has no internal Netmusic dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: TOML pipeline configuration and source file roles
//! - [`util`]: Node identifier helpers

pub mod config;
pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use config::{DanglingPolicy, FileNames, FileRole, NetmusicConfig};
pub use error::{Error, Result};

// Convenience re-exports from util
pub use util::ids::{music_node_id, user_node_id};
