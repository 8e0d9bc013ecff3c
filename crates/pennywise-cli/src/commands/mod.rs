//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analytics` - Analytics report and investment plan (JSON output)
//! - `core` - Core commands (init, status) and shared utilities (open_db, load_config, parse_date)
//! - `import` - CSV import and export
//! - `seed` - Demo data generation
//! - `summary` - Ledger totals and the daily trend
//! - `training` - Model retraining and artifact status
//! - `transactions` - Transaction commands (add, list, delete, clear)

pub mod analytics;
pub mod core;
pub mod import;
pub mod seed;
pub mod summary;
pub mod training;
pub mod transactions;

// Re-export command functions for main.rs
pub use analytics::*;
pub use core::*;
pub use import::*;
pub use seed::*;
pub use summary::*;
pub use training::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
