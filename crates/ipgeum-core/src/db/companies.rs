//! Company (category) operations

use rusqlite::params;
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ApprovedCompany, Company};

impl Database {
    /// Register a company, or update its approval if it already exists
    pub fn add_company(&self, name: &str, approved: bool) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Company name must not be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO companies (name, is_approved) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET is_approved = excluded.is_approved",
            params![name, approved],
        )?;

        let id = conn.query_row(
            "SELECT id FROM companies WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;

        info!(company = name, approved, "Company saved");
        Ok(id)
    }

    /// Approve or revoke a company by name
    pub fn set_company_approved(&self, name: &str, approved: bool) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE companies SET is_approved = ? WHERE name = ?",
            params![approved, name],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Company {}", name)));
        }
        Ok(())
    }

    /// Remove a company together with its ledger rows.
    ///
    /// Returns how many deposits went with it.
    pub fn delete_company(&self, name: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let deposits = tx.execute("DELETE FROM deposits WHERE company = ?", params![name])?;
        let deleted = tx.execute("DELETE FROM companies WHERE name = ?", params![name])?;
        if deleted == 0 {
            // Dropping the transaction rolls back the deposit delete
            return Err(Error::NotFound(format!("Company {}", name)));
        }
        tx.commit()?;

        info!(company = name, deposits, "Company deleted");
        Ok(deposits)
    }

    pub fn list_companies(&self) -> Result<Vec<Company>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, is_approved, created_at FROM companies ORDER BY name")?;

        let companies = stmt
            .query_map([], |row| {
                let created_at: String = row.get(3)?;
                Ok(Company {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    is_approved: row.get(2)?,
                    created_at: parse_datetime(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(companies)
    }

    /// Companies the parser may attach to incoming messages, in id order
    pub fn approved_companies(&self) -> Result<Vec<ApprovedCompany>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM companies WHERE is_approved = 1 ORDER BY id")?;

        let companies = stmt
            .query_map([], |row| Ok(ApprovedCompany::new(row.get::<_, String>(0)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(companies)
    }
}
