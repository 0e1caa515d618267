//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod roi;
pub mod status;
pub mod tables;

// Re-export all handlers for use in router
pub use roi::*;
pub use status::*;
pub use tables::*;
