//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ipgeum_core::models::NewMatchingMember;

/// Ipgeum - Korean bank deposit notification parser
#[derive(Parser)]
#[command(name = "ipgeum")]
#[command(about = "Parse Korean bank SMS notifications into a deposit ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ipgeum.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set IPGEUM_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Parse a notification and print the result as JSON
    Parse {
        /// Notification text (reads --file or stdin when omitted)
        text: Option<String>,

        /// Read the notification from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Approved company name (repeatable)
        #[arg(short, long = "company")]
        companies: Vec<String>,

        /// Reference date for MM/DD-only datetimes (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Use approved companies and matching members from the database
        #[arg(long)]
        with_db: bool,
    },

    /// Parse a notification and store it in the deposit ledger
    Ingest {
        /// Notification text (reads --file or stdin when omitted)
        text: Option<String>,

        /// Read the notification from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Manage companies
    Companies {
        #[command(subcommand)]
        action: Option<CompaniesAction>,
    },

    /// Manage matching members
    Members {
        #[command(subcommand)]
        action: Option<MembersAction>,
    },

    /// List recent deposits
    Deposits {
        /// Number of rows to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only show deposits for this company
        #[arg(short, long)]
        company: Option<String>,

        #[command(subcommand)]
        action: Option<DepositsAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum CompaniesAction {
    /// List all companies
    List,

    /// Register a company (approved unless --pending)
    Add {
        /// Company name as it appears in notifications
        name: String,

        /// Register without approving
        #[arg(long)]
        pending: bool,
    },

    /// Approve a company
    Approve {
        /// Company name
        name: String,
    },

    /// Revoke a company's approval
    Revoke {
        /// Company name
        name: String,
    },

    /// Delete a company and all of its deposits
    Remove {
        /// Company name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum MembersAction {
    /// List matching members
    List {
        /// Only show members of this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Register an account holder for a category
    Add(MemberArgs),

    /// Replace a matching member's details
    Update {
        /// Member ID
        id: i64,

        #[command(flatten)]
        member: MemberArgs,
    },

    /// Remove a matching member by ID
    Remove {
        /// Member ID
        id: i64,
    },
}

#[derive(Args)]
pub struct MemberArgs {
    /// Category (company name)
    pub category: String,

    /// Account holder name as the bank prints it
    pub holder: String,

    /// Display name, unique within the category (defaults to the holder)
    #[arg(long)]
    pub name: Option<String>,

    /// Bank name
    #[arg(long)]
    pub bank: Option<String>,

    /// Account number
    #[arg(long)]
    pub account: Option<String>,
}

impl MemberArgs {
    pub fn into_member(self) -> NewMatchingMember {
        NewMatchingMember {
            member_name: self.name.unwrap_or_else(|| self.holder.clone()),
            category: self.category,
            account_holder: self.holder,
            bank_name: self.bank,
            account_number: self.account,
        }
    }
}

#[derive(Subcommand)]
pub enum DepositsAction {
    /// Delete a ledger row by ID
    Remove {
        /// Deposit ID
        id: i64,
    },

    /// List companies that appear in the ledger
    Companies,
}
