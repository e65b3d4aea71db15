//! Server command implementation

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ipgeum_core::LookupFailurePolicy;

use super::open_db;

/// Build the server configuration from environment variables
pub fn server_config_from_env() -> Result<ipgeum_server::ServerConfig> {
    let allowed_origins =
        ipgeum_server::parse_origins(&std::env::var("IPGEUM_ALLOWED_ORIGINS").unwrap_or_default());

    let lookup_timeout = match std::env::var("IPGEUM_LOOKUP_TIMEOUT_MS") {
        Ok(ms) if !ms.trim().is_empty() => Duration::from_millis(
            ms.trim()
                .parse()
                .with_context(|| format!("Invalid IPGEUM_LOOKUP_TIMEOUT_MS: {}", ms))?,
        ),
        _ => ipgeum_server::DEFAULT_LOOKUP_TIMEOUT,
    };

    let lookup_failure = match std::env::var("IPGEUM_LOOKUP_FAILURE") {
        Ok(policy) if !policy.trim().is_empty() => policy
            .parse::<LookupFailurePolicy>()
            .map_err(|e| anyhow::anyhow!("Invalid IPGEUM_LOOKUP_FAILURE: {}", e))?,
        _ => LookupFailurePolicy::default(),
    };

    Ok(ipgeum_server::ServerConfig {
        allowed_origins,
        lookup_timeout,
        lookup_failure,
    })
}

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, no_encrypt: bool) -> Result<()> {
    let config = server_config_from_env()?;

    println!("🚀 Starting Ipgeum web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Member lookup: {}ms timeout, on failure: {}",
        config.lookup_timeout.as_millis(),
        config.lookup_failure
    );
    if config.allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!(
            "   CORS: {} (IPGEUM_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;
    ipgeum_server::serve_with_config(db, host, port, config).await?;

    Ok(())
}
