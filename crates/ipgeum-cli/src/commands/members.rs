//! Matching member command implementations

use anyhow::Result;
use ipgeum_core::db::Database;
use ipgeum_core::models::NewMatchingMember;

pub fn cmd_members_list(db: &Database, category: Option<&str>) -> Result<()> {
    let members = db.list_matching_members(category)?;

    if members.is_empty() {
        println!("No matching members found. Add one with:");
        println!("  ipgeum members add <category> <holder>");
        return Ok(());
    }

    println!();
    println!("👥 Matching Members");
    println!("   ─────────────────────────────────────────");

    for member in members {
        let account = match (&member.bank_name, &member.account_number) {
            (Some(bank), Some(number)) => format!(" │ {} {}", bank, number),
            (Some(bank), None) => format!(" │ {}", bank),
            (None, Some(number)) => format!(" │ {}", number),
            (None, None) => String::new(),
        };
        if member.member_name == member.account_holder {
            println!(
                "   [{}] {} │ {}{}",
                member.id, member.category, member.account_holder, account
            );
        } else {
            println!(
                "   [{}] {} │ {} ({}){}",
                member.id, member.category, member.member_name, member.account_holder, account
            );
        }
    }

    Ok(())
}

pub fn cmd_members_add(db: &Database, member: &NewMatchingMember) -> Result<()> {
    let id = db.create_matching_member(member)?;
    println!(
        "✅ '{}' registered for '{}' (id {})",
        member.member_name, member.category, id
    );
    Ok(())
}

pub fn cmd_members_update(db: &Database, id: i64, member: &NewMatchingMember) -> Result<()> {
    db.update_matching_member(id, member)?;
    println!("✅ Matching member {} updated", id);
    Ok(())
}

pub fn cmd_members_remove(db: &Database, id: i64) -> Result<()> {
    db.delete_matching_member(id)?;
    println!("🗑️  Removed matching member {}", id);
    Ok(())
}
