//! Deposit ledger operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{format_naive_datetime, parse_datetime, parse_naive_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Deposit, DepositFilter, NewDeposit, TransactionType};

/// Largest page [`Database::list_deposits`] returns
pub const MAX_DEPOSIT_PAGE: i64 = 500;

const DEPOSIT_COLUMNS: &str = "id, date, bank, amount, balance, sender, company, transaction_type, \
     sms_raw, is_matching_member, requires_new_alert, parse_success, is_checked, created_at";

fn deposit_from_row(row: &Row<'_>) -> rusqlite::Result<Deposit> {
    let created_at: String = row.get(13)?;
    Ok(Deposit {
        id: row.get(0)?,
        date: parse_naive_datetime(row.get(1)?),
        bank: row.get(2)?,
        amount: row.get(3)?,
        balance: row.get(4)?,
        sender: row.get(5)?,
        company: row.get(6)?,
        transaction_type: TransactionType::from_code(row.get(7)?),
        sms_raw: row.get(8)?,
        is_matching_member: row.get(9)?,
        requires_new_alert: row.get(10)?,
        parse_success: row.get(11)?,
        is_checked: row.get(12)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Record one inbound message
    pub fn insert_deposit(&self, deposit: &NewDeposit) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO deposits (date, bank, amount, balance, sender, company, transaction_type,
                                   sms_raw, is_matching_member, requires_new_alert, parse_success)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                deposit.date.as_ref().map(format_naive_datetime),
                deposit.bank,
                deposit.amount,
                deposit.balance,
                deposit.sender,
                deposit.company,
                deposit.transaction_type.code(),
                deposit.sms_raw,
                deposit.is_matching_member,
                deposit.requires_new_alert,
                deposit.parse_success,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!(
            id,
            parse_success = deposit.parse_success,
            transaction_type = %deposit.transaction_type,
            company = deposit.company.as_deref().unwrap_or(""),
            "Deposit recorded"
        );
        Ok(id)
    }

    /// Newest first. `search` matches sender, bank or the raw text.
    pub fn list_deposits(&self, filter: &DepositFilter) -> Result<Vec<Deposit>> {
        let limit = match filter.limit {
            l if l <= 0 => MAX_DEPOSIT_PAGE,
            l => l.min(MAX_DEPOSIT_PAGE),
        };
        let offset = filter.offset.max(0);
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM deposits
             WHERE (?1 IS NULL OR company = ?1)
               AND (?2 IS NULL OR sender LIKE ?2 OR bank LIKE ?2 OR sms_raw LIKE ?2)
             ORDER BY COALESCE(date, created_at) DESC, id DESC
             LIMIT ?3 OFFSET ?4",
            DEPOSIT_COLUMNS
        ))?;

        let deposits = stmt
            .query_map(
                params![filter.company, search, limit, offset],
                deposit_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(deposits)
    }

    pub fn get_deposit(&self, id: i64) -> Result<Option<Deposit>> {
        let conn = self.conn()?;
        let deposit = conn
            .query_row(
                &format!("SELECT {} FROM deposits WHERE id = ?", DEPOSIT_COLUMNS),
                params![id],
                deposit_from_row,
            )
            .optional()?;
        Ok(deposit)
    }

    /// Mark a ledger row as reviewed (or not)
    pub fn set_deposit_checked(&self, id: i64, checked: bool) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE deposits SET is_checked = ? WHERE id = ?",
            params![checked, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Deposit {}", id)));
        }
        Ok(())
    }

    pub fn delete_deposit(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM deposits WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Deposit {}", id)));
        }
        info!(id, "Deposit deleted");
        Ok(())
    }

    /// Distinct non-empty companies that appear in the ledger
    pub fn deposit_companies(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT company FROM deposits
             WHERE company IS NOT NULL AND company != ''
             ORDER BY company",
        )?;

        let companies = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(companies)
    }

    /// Rows nobody has reviewed yet, optionally for one company
    pub fn unchecked_count(&self, company: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM deposits WHERE is_checked = 0 AND (?1 IS NULL OR company = ?1)",
            params![company],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
