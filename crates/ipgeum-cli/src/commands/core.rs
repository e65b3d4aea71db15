//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `read_text` - Notification text from an argument, a file or stdin
//! - `cmd_init` - Initialize the database

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use ipgeum_core::db::Database;
use tracing::info;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Resolve the notification text: the argument wins, then the file, then stdin
pub fn read_text(text: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }

    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read notification from stdin")?;
    Ok(buf)
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let companies = db.list_companies().context("Failed to read companies")?;
    println!("   Companies registered: {}", companies.len());

    let encrypted = db.is_encrypted();
    info!(path = %db_path.display(), encrypted, "Database ready");
    if !encrypted {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Register a company: ipgeum companies add <name>");
    println!("  2. Start the API: ipgeum serve");

    Ok(())
}
