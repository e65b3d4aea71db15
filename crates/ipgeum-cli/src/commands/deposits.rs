//! Deposit ledger command implementations

use anyhow::Result;
use ipgeum_core::db::Database;
use ipgeum_core::models::{DepositFilter, TransactionType};

use super::truncate;

pub fn cmd_deposits_list(db: &Database, limit: i64, company: Option<&str>) -> Result<()> {
    let filter = DepositFilter {
        company: company.map(String::from),
        limit,
        ..Default::default()
    };
    let deposits = db.list_deposits(&filter)?;

    if deposits.is_empty() {
        println!("No deposits found. Store one with:");
        println!("  ipgeum ingest --file sms.txt");
        return Ok(());
    }

    let unchecked = db.unchecked_count(company)?;

    println!();
    println!("💰 Recent Deposits ({} unchecked)", unchecked);
    println!("   ─────────────────────────────────────────────────────────────");

    for deposit in deposits {
        let date = deposit
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "????-??-?? ??:??".to_string());
        let mark = if deposit.is_checked { "✓" } else { " " };

        if !deposit.parse_success {
            println!(
                "   [{}]{} {} │ \x1b[33munparsed\x1b[0m │ {}",
                deposit.id,
                mark,
                date,
                truncate(&deposit.sms_raw.replace('\n', " "), 40)
            );
            continue;
        }

        let amount = deposit.amount.unwrap_or_default();
        let amount_str = if deposit.transaction_type == TransactionType::Withdrawal {
            format!("\x1b[31m-{}\x1b[0m", amount) // Red for withdrawals
        } else {
            format!("\x1b[32m+{}\x1b[0m", amount) // Green for deposits
        };
        let alert = if deposit.requires_new_alert { " 🆕" } else { "" };

        println!(
            "   [{}]{} {} │ {:>12} │ {} │ {}{}",
            deposit.id,
            mark,
            date,
            amount_str,
            deposit.bank.as_deref().unwrap_or("-"),
            truncate(deposit.sender.as_deref().unwrap_or("-"), 20),
            alert
        );
    }

    Ok(())
}

pub fn cmd_deposits_remove(db: &Database, id: i64) -> Result<()> {
    db.delete_deposit(id)?;
    println!("🗑️  Removed deposit {}", id);
    Ok(())
}

pub fn cmd_deposits_companies(db: &Database) -> Result<()> {
    let companies = db.deposit_companies()?;
    if companies.is_empty() {
        println!("No companies in the ledger yet.");
        return Ok(());
    }
    for company in companies {
        println!("{}", company);
    }
    Ok(())
}
