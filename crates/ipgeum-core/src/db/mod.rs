//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `companies` - Companies (categories) and their approval state
//! - `matching` - Matching members and the [`MatchingLookup`] implementation
//! - `deposits` - The deposit ledger

use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod companies;
mod deposits;
mod matching;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "IPGEUM_DB_KEY";

/// Connections per pool
pub const POOL_SIZE: u32 = 10;

const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive an encryption key from a passphrase using Argon2
///
/// The application salt is fixed so the same passphrase always opens the
/// same database, wherever the file lives.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"ipgeum-salt-v1-x";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(output.as_bytes()))
}

/// Parse a SQLite `CURRENT_TIMESTAMP` value
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, SQLITE_DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored transaction date; malformed values read back as absent
pub(crate) fn parse_naive_datetime(s: Option<String>) -> Option<NaiveDateTime> {
    s.and_then(|s| NaiveDateTime::parse_from_str(&s, SQLITE_DATETIME_FORMAT).ok())
}

pub(crate) fn format_naive_datetime(dt: &NaiveDateTime) -> String {
    dt.format(SQLITE_DATETIME_FORMAT).to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    encrypted: bool,
}

impl Database {
    /// Open an encrypted database
    ///
    /// Requires `IPGEUM_DB_KEY`. The SQLCipher key is derived from that
    /// passphrase with Argon2. Use `new_unencrypted()` for local testing.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open an unencrypted database
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a database with an explicit passphrase
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Every pooled connection needs the key before first use
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(POOL_SIZE).build(manager)?
        } else {
            Pool::builder().max_size(POOL_SIZE).build(manager)?
        };

        let db = Self {
            pool,
            encrypted: passphrase.is_some(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because SQLCipher has
    /// issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "ipgeum_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Whether the database was opened with a SQLCipher key
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL: readers don't block the SMS ingest writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Companies (categories). Only approved ones are offered to the parser.
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                is_approved INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Registered members per category. Lookups match on account_holder;
            -- member_name is the operator-facing name and unique per category.
            CREATE TABLE IF NOT EXISTS matching_members (
                id INTEGER PRIMARY KEY,
                category TEXT NOT NULL,
                member_name TEXT NOT NULL,
                account_holder TEXT NOT NULL,
                bank_name TEXT,
                account_number TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(category, member_name)
            );

            CREATE INDEX IF NOT EXISTS idx_matching_members_holder ON matching_members(category, account_holder);

            -- Deposit ledger. sms_raw is always kept, even when parsing failed.
            CREATE TABLE IF NOT EXISTS deposits (
                id INTEGER PRIMARY KEY,
                date DATETIME,
                bank TEXT,
                amount INTEGER,
                balance INTEGER,
                sender TEXT,
                company TEXT,
                transaction_type INTEGER NOT NULL DEFAULT 1,   -- 1 deposit, 0 withdrawal
                sms_raw TEXT NOT NULL,
                is_matching_member INTEGER NOT NULL DEFAULT 0,
                requires_new_alert INTEGER NOT NULL DEFAULT 0,
                parse_success INTEGER NOT NULL DEFAULT 0,
                is_checked INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_deposits_company ON deposits(company);
            CREATE INDEX IF NOT EXISTS idx_deposits_checked ON deposits(is_checked);
            CREATE INDEX IF NOT EXISTS idx_deposits_date ON deposits(date);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
