//! Ipgeum Core Library
//!
//! Shared functionality for the ipgeum deposit-notification tools:
//! - Bank SMS / push-notification parser
//! - Matching-member lookup capability
//! - Intake validation and datetime normalization
//! - Database access and migrations

#[macro_use]
mod macros;

pub mod db;
pub mod error;
pub mod intake;
pub mod matching;
pub mod models;
pub mod parser;

pub use db::Database;
pub use error::{Error, Result};
pub use intake::{evaluate, has_transaction_keyword, ingest, normalize_datetime, Ingested, IntakeOutcome};
pub use matching::{LookupFailurePolicy, MatchingLookup, MemberDirectory};
pub use models::{ApprovedCompany, ParsedTransaction, TransactionType};
pub use parser::{parse_text, parse_text_on, parse_transaction, parse_transaction_with, ParseOptions};
