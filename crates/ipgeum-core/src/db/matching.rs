//! Matching member operations

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::matching::MatchingLookup;
use crate::models::{MatchingMember, NewMatchingMember};

const MEMBER_COLUMNS: &str =
    "id, category, member_name, account_holder, bank_name, account_number, created_at";

fn member_from_row(row: &Row) -> rusqlite::Result<MatchingMember> {
    let created_at: String = row.get(6)?;
    Ok(MatchingMember {
        id: row.get(0)?,
        category: row.get(1)?,
        member_name: row.get(2)?,
        account_holder: row.get(3)?,
        bank_name: row.get(4)?,
        account_number: row.get(5)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Trim every field; blank optional fields become NULL
fn normalize(member: &NewMatchingMember) -> Result<NewMatchingMember> {
    let optional = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };
    let normalized = NewMatchingMember {
        category: member.category.trim().to_string(),
        member_name: member.member_name.trim().to_string(),
        account_holder: member.account_holder.trim().to_string(),
        bank_name: optional(&member.bank_name),
        account_number: optional(&member.account_number),
    };

    if normalized.category.is_empty()
        || normalized.member_name.is_empty()
        || normalized.account_holder.is_empty()
    {
        return Err(Error::InvalidData(
            "Category, member name and account holder must not be empty".into(),
        ));
    }
    Ok(normalized)
}

impl Database {
    /// Register a member. Member names are unique within a category.
    pub fn create_matching_member(&self, member: &NewMatchingMember) -> Result<i64> {
        let member = normalize(member)?;
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM matching_members WHERE category = ? AND member_name = ?",
                params![member.category, member.member_name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::InvalidData(format!(
                "Member '{}' already exists in '{}'",
                member.member_name, member.category
            )));
        }

        conn.execute(
            "INSERT INTO matching_members (category, member_name, account_holder, bank_name, account_number)
             VALUES (?, ?, ?, ?, ?)",
            params![
                member.category,
                member.member_name,
                member.account_holder,
                member.bank_name,
                member.account_number
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Register an account holder under their own name
    pub fn add_matching_member(&self, category: &str, account_holder: &str) -> Result<i64> {
        self.create_matching_member(&NewMatchingMember::new(category, account_holder))
    }

    /// Replace every field of an existing member
    pub fn update_matching_member(&self, id: i64, member: &NewMatchingMember) -> Result<()> {
        let member = normalize(member)?;
        let conn = self.conn()?;

        let duplicate: Option<i64> = conn
            .query_row(
                "SELECT id FROM matching_members WHERE category = ? AND member_name = ? AND id != ?",
                params![member.category, member.member_name, id],
                |row| row.get(0),
            )
            .optional()?;
        if duplicate.is_some() {
            return Err(Error::InvalidData(format!(
                "Member '{}' already exists in '{}'",
                member.member_name, member.category
            )));
        }

        let updated = conn.execute(
            "UPDATE matching_members
             SET category = ?, member_name = ?, account_holder = ?, bank_name = ?, account_number = ?
             WHERE id = ?",
            params![
                member.category,
                member.member_name,
                member.account_holder,
                member.bank_name,
                member.account_number,
                id
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Matching member {}", id)));
        }
        Ok(())
    }

    pub fn get_matching_member(&self, id: i64) -> Result<Option<MatchingMember>> {
        let conn = self.conn()?;
        let member = conn
            .query_row(
                &format!("SELECT {} FROM matching_members WHERE id = ?", MEMBER_COLUMNS),
                params![id],
                member_from_row,
            )
            .optional()?;
        Ok(member)
    }

    pub fn list_matching_members(&self, category: Option<&str>) -> Result<Vec<MatchingMember>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matching_members
             WHERE (?1 IS NULL OR category = ?1)
             ORDER BY category, member_name",
            MEMBER_COLUMNS
        ))?;

        let members = stmt
            .query_map(params![category], member_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(members)
    }

    pub fn delete_matching_member(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM matching_members WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Matching member {}", id)));
        }
        Ok(())
    }

    /// Find the member a holder name resolves to: exact name, or a stored
    /// name containing it
    pub fn find_matching_member(
        &self,
        category: &str,
        account_holder: &str,
    ) -> Result<Option<MatchingMember>> {
        if category.is_empty() || account_holder.is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;
        let member = conn
            .query_row(
                &format!(
                    "SELECT {} FROM matching_members
                     WHERE category = ?1 AND (account_holder = ?2 OR instr(account_holder, ?2) > 0)
                     ORDER BY account_holder = ?2 DESC, id
                     LIMIT 1",
                    MEMBER_COLUMNS
                ),
                params![category, account_holder],
                member_from_row,
            )
            .optional()?;

        Ok(member)
    }
}

#[async_trait]
impl MatchingLookup for Database {
    /// Pool checkout and the query block, so they run on the blocking pool
    /// and callers can bound the lookup with a timeout.
    async fn is_matching_member(&self, category: &str, account_holder: &str) -> Result<bool> {
        let db = self.clone();
        let (category, account_holder) = (category.to_string(), account_holder.to_string());

        tokio::task::spawn_blocking(move || db.find_matching_member(&category, &account_holder))
            .await
            .map_err(|e| Error::Lookup(format!("lookup task failed: {}", e)))?
            .map(|member| member.is_some())
    }
}
