//! Utility modules.
//!
//! # Modules
//!
//! - [`ids`]: Node identifier construction

pub mod ids;
