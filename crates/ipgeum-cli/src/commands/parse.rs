//! Parse and ingest command implementations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use ipgeum_core::db::Database;
use ipgeum_core::intake::{ingest, Ingested};
use ipgeum_core::{
    parse_transaction_with, ApprovedCompany, LookupFailurePolicy, MatchingLookup, ParseOptions,
};
use ipgeum_server::{TimedLookup, DEFAULT_LOOKUP_TIMEOUT};

/// Parse one notification and print it as JSON
///
/// With a database, its approved companies are added to `extra_companies`
/// and matching members are looked up.
pub async fn cmd_parse(
    text: &str,
    extra_companies: &[String],
    today: Option<NaiveDate>,
    db: Option<&Database>,
) -> Result<()> {
    let mut companies: Vec<ApprovedCompany> = match db {
        Some(db) => db
            .approved_companies()
            .context("Failed to load approved companies")?,
        None => Vec::new(),
    };
    for name in extra_companies {
        if !companies.iter().any(|c| &c.name == name) {
            companies.push(ApprovedCompany::new(name.as_str()));
        }
    }

    let options = ParseOptions {
        today,
        on_lookup_error: LookupFailurePolicy::default(),
    };
    let lookup = db.map(|db| TimedLookup::new(db, DEFAULT_LOOKUP_TIMEOUT));
    let parsed = parse_transaction_with(
        text,
        &companies,
        lookup.as_ref().map(|l| l as &dyn MatchingLookup),
        &options,
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

/// Parse, evaluate and store one notification; returns the ledger row ID
pub async fn cmd_ingest(db: &Database, text: &str) -> Result<i64> {
    let lookup = TimedLookup::new(db, DEFAULT_LOOKUP_TIMEOUT);
    let Ingested {
        id,
        parsed,
        outcome,
    } = ingest(
        db,
        text,
        &lookup,
        &ParseOptions::default(),
        Local::now().naive_local(),
    )
    .await
    .context("Failed to store deposit")?;

    match &outcome.deposit {
        Some(deposit) => {
            println!("✅ Stored deposit #{}", id);
            println!("   Date:    {}", deposit.date);
            println!("   Bank:    {}", deposit.bank);
            println!("   Amount:  {}", deposit.amount);
            println!("   Sender:  {}", deposit.sender);
            if !deposit.company.is_empty() {
                println!("   Company: {}", deposit.company);
            }
            if parsed.requires_new_alert {
                println!("   🆕 New depositor for this company");
            }
        }
        None => {
            println!("⚠️  Stored unparsed message #{} for review", id);
            if !outcome.missing.is_empty() {
                let missing: Vec<&str> = outcome.missing.iter().map(|f| f.as_str()).collect();
                println!("   Missing: {}", missing.join(", "));
            }
            if let Some(raw) = &outcome.rejected_datetime {
                println!("   Unusable datetime: {}", raw);
            }
        }
    }

    Ok(id)
}
