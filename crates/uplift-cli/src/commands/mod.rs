//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, workbook loading, filters)
//! - `hierarchy` - Hierarchy tree and available years
//! - `roi` - ROI report and promotion drill-down
//! - `serve` - Web server command
//! - `status` - Workbook table status

pub mod core;
pub mod hierarchy;
pub mod roi;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use hierarchy::*;
pub use roi::*;
pub use serve::*;
pub use status::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a currency amount, sign before the symbol
pub fn money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}
