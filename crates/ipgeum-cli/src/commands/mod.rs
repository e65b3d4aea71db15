//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, read_text)
//! - `parse` - Parse preview and ingestion into the ledger
//! - `companies` - Company registration and approval
//! - `members` - Matching member management
//! - `deposits` - Deposit ledger listing
//! - `serve` - Web server command

pub mod companies;
pub mod core;
pub mod deposits;
pub mod members;
pub mod parse;
pub mod serve;

// Re-export command functions for main.rs
pub use companies::*;
pub use core::*;
pub use deposits::*;
pub use members::*;
pub use parse::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
