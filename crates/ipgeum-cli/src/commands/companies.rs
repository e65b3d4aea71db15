//! Company command implementations

use anyhow::Result;
use ipgeum_core::db::Database;

pub fn cmd_companies_list(db: &Database) -> Result<()> {
    let companies = db.list_companies()?;

    if companies.is_empty() {
        println!("No companies registered. Add one with:");
        println!("  ipgeum companies add <name>");
        return Ok(());
    }

    println!();
    println!("🏢 Companies");
    println!("   ─────────────────────────────────────────");

    for company in companies {
        let status = if company.is_approved {
            "\x1b[32mapproved\x1b[0m"
        } else {
            "\x1b[33mpending\x1b[0m "
        };
        println!("   [{}] {} │ {}", company.id, status, company.name);
    }

    Ok(())
}

pub fn cmd_companies_add(db: &Database, name: &str, approved: bool) -> Result<()> {
    let id = db.add_company(name, approved)?;
    if approved {
        println!("✅ Company '{}' registered and approved (id {})", name.trim(), id);
    } else {
        println!("✅ Company '{}' registered, pending approval (id {})", name.trim(), id);
    }
    Ok(())
}

pub fn cmd_companies_set_approved(db: &Database, name: &str, approved: bool) -> Result<()> {
    db.set_company_approved(name, approved)?;
    if approved {
        println!("✅ Company '{}' approved", name);
    } else {
        println!("🚫 Company '{}' approval revoked", name);
    }
    Ok(())
}

pub fn cmd_companies_remove(db: &Database, name: &str) -> Result<()> {
    let deposits = db.delete_company(name)?;
    println!("🗑️  Removed company '{}' and {} deposit(s)", name, deposits);
    Ok(())
}
