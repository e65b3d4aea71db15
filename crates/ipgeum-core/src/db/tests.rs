//! Database tests

use super::*;
use crate::matching::MatchingLookup;
use crate::models::*;
use chrono::NaiveDate;

fn new_deposit(sender: Option<&str>, company: Option<&str>, parse_success: bool) -> NewDeposit {
    NewDeposit {
        date: NaiveDate::from_ymd_opt(2025, 7, 4)
            .and_then(|d| d.and_hms_opt(15, 18, 0)),
        bank: Some("농협".into()),
        amount: Some(10000),
        balance: Some(3710000),
        sender: sender.map(String::from),
        company: company.map(String::from),
        transaction_type: TransactionType::Deposit,
        sms_raw: "농협 입금10,000원".into(),
        is_matching_member: false,
        requires_new_alert: true,
        parse_success,
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_companies().unwrap().is_empty());
    assert!(db.list_matching_members(None).unwrap().is_empty());
    assert_eq!(db.unchecked_count(None).unwrap(), 0);
    assert!(!db.is_encrypted());
}

#[test]
fn test_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('deposits') WHERE name IN ('sms_raw', 'parse_success', 'is_checked', 'transaction_type')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(columns, 4);
}

#[test]
fn test_derive_key_is_stable() {
    let a = derive_key("passphrase").unwrap();
    let b = derive_key("passphrase").unwrap();
    let c = derive_key("other").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn test_company_approval_flow() {
    let db = Database::in_memory().unwrap();

    db.add_company("아미", true).unwrap();
    db.add_company("mori", false).unwrap();

    let approved = db.approved_companies().unwrap();
    assert_eq!(approved, vec![ApprovedCompany::new("아미")]);

    db.set_company_approved("mori", true).unwrap();
    assert_eq!(db.approved_companies().unwrap().len(), 2);

    db.set_company_approved("아미", false).unwrap();
    let approved = db.approved_companies().unwrap();
    assert_eq!(approved, vec![ApprovedCompany::new("mori")]);

    assert_eq!(db.list_companies().unwrap().len(), 2);
}

#[test]
fn test_add_company_is_upsert() {
    let db = Database::in_memory().unwrap();
    let first = db.add_company("아미", false).unwrap();
    let second = db.add_company("아미", true).unwrap();
    assert_eq!(first, second);
    assert!(db.list_companies().unwrap()[0].is_approved);
}

#[test]
fn test_company_validation() {
    let db = Database::in_memory().unwrap();
    assert!(matches!(db.add_company("  ", true), Err(Error::InvalidData(_))));
    assert!(matches!(
        db.set_company_approved("missing", true),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_matching_member_crud() {
    let db = Database::in_memory().unwrap();

    let id = db.add_matching_member("아미", "신동수").unwrap();
    assert!(matches!(
        db.add_matching_member("아미", "신동수"),
        Err(Error::InvalidData(_))
    ));
    db.add_matching_member("mori", "김양곤").unwrap();

    assert_eq!(db.list_matching_members(None).unwrap().len(), 2);
    let ami = db.list_matching_members(Some("아미")).unwrap();
    assert_eq!(ami.len(), 1);
    assert_eq!(ami[0].account_holder, "신동수");

    db.delete_matching_member(id).unwrap();
    assert!(db.list_matching_members(Some("아미")).unwrap().is_empty());
    assert!(matches!(
        db.delete_matching_member(id),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_matching_member_details_and_update() {
    let db = Database::in_memory().unwrap();

    let id = db
        .create_matching_member(&NewMatchingMember {
            category: " 아미 ".into(),
            member_name: "동수".into(),
            account_holder: "신동수".into(),
            bank_name: Some("농협".into()),
            account_number: Some("  ".into()),
        })
        .unwrap();

    let member = db.get_matching_member(id).unwrap().unwrap();
    assert_eq!(member.category, "아미");
    assert_eq!(member.member_name, "동수");
    assert_eq!(member.bank_name.as_deref(), Some("농협"));
    assert!(member.account_number.is_none());

    // Holder names are matched, not member names
    assert!(db.find_matching_member("아미", "신동수").unwrap().is_some());
    assert!(db.find_matching_member("아미", "동수").unwrap().is_none());

    let mut update = NewMatchingMember::new("아미", "김민지");
    update.account_number = Some("110-123-456789".into());
    db.update_matching_member(id, &update).unwrap();

    let member = db.get_matching_member(id).unwrap().unwrap();
    assert_eq!(member.member_name, "김민지");
    assert_eq!(member.account_holder, "김민지");
    assert!(member.bank_name.is_none());
    assert_eq!(member.account_number.as_deref(), Some("110-123-456789"));

    // Saving a member under its own name is not a duplicate
    db.update_matching_member(id, &update).unwrap();

    db.add_matching_member("아미", "홍길동").unwrap();
    assert!(matches!(
        db.update_matching_member(id, &NewMatchingMember::new("아미", "홍길동")),
        Err(Error::InvalidData(_))
    ));
    assert!(matches!(
        db.update_matching_member(9999, &update),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        db.create_matching_member(&NewMatchingMember::new("아미", " ")),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_find_matching_member_rules() {
    let db = Database::in_memory().unwrap();
    db.add_matching_member("아미", "신동수(아미)").unwrap();
    db.add_matching_member("아미", "김양곤").unwrap();

    // Stored name contains the queried one
    let found = db.find_matching_member("아미", "신동수").unwrap().unwrap();
    assert_eq!(found.account_holder, "신동수(아미)");

    assert!(db.find_matching_member("아미", "김양곤").unwrap().is_some());
    assert!(db.find_matching_member("mori", "김양곤").unwrap().is_none());
    assert!(db.find_matching_member("아미", "").unwrap().is_none());
    // LIKE wildcards are not special
    assert!(db.find_matching_member("아미", "%").unwrap().is_none());
}

#[tokio::test]
async fn test_database_is_a_matching_lookup() {
    let db = Database::in_memory().unwrap();
    db.add_matching_member("아미", "신동수").unwrap();

    assert!(db.is_matching_member("아미", "신동수").await.unwrap());
    assert!(!db.is_matching_member("아미", "홍길동").await.unwrap());
}

#[test]
fn test_insert_and_get_deposit() {
    let db = Database::in_memory().unwrap();
    let row = new_deposit(Some("신동수"), Some("아미"), true);
    let id = db.insert_deposit(&row).unwrap();

    let stored = db.get_deposit(id).unwrap().unwrap();
    assert_eq!(stored.sender.as_deref(), Some("신동수"));
    assert_eq!(stored.amount, Some(10000));
    assert_eq!(stored.transaction_type, TransactionType::Deposit);
    assert_eq!(stored.date, row.date);
    assert!(stored.parse_success);
    assert!(stored.requires_new_alert);
    assert!(!stored.is_checked);

    assert!(db.get_deposit(id + 100).unwrap().is_none());
}

#[test]
fn test_failed_parse_is_still_stored() {
    let db = Database::in_memory().unwrap();
    let row = NewDeposit {
        date: None,
        bank: None,
        amount: None,
        balance: None,
        sender: None,
        company: None,
        transaction_type: TransactionType::Deposit,
        sms_raw: "알 수 없는 형식".into(),
        is_matching_member: false,
        requires_new_alert: false,
        parse_success: false,
    };
    let id = db.insert_deposit(&row).unwrap();

    let stored = db.get_deposit(id).unwrap().unwrap();
    assert!(!stored.parse_success);
    assert_eq!(stored.sms_raw, "알 수 없는 형식");
    assert!(stored.date.is_none());
}

#[test]
fn test_list_deposits_filters() {
    let db = Database::in_memory().unwrap();
    db.insert_deposit(&new_deposit(Some("신동수"), Some("아미"), true))
        .unwrap();
    db.insert_deposit(&new_deposit(Some("김양곤"), Some("mori"), true))
        .unwrap();
    db.insert_deposit(&new_deposit(Some("박영희"), Some("아미"), true))
        .unwrap();

    let all = db.list_deposits(&DepositFilter::default()).unwrap();
    assert_eq!(all.len(), 3);

    let ami = db
        .list_deposits(&DepositFilter {
            company: Some("아미".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(ami.len(), 2);

    let search = db
        .list_deposits(&DepositFilter {
            search: Some("김양".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].company.as_deref(), Some("mori"));

    let page = db
        .list_deposits(&DepositFilter {
            limit: 1,
            offset: 1,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
}

#[test]
fn test_unchecked_count_and_check() {
    let db = Database::in_memory().unwrap();
    let first = db
        .insert_deposit(&new_deposit(Some("신동수"), Some("아미"), true))
        .unwrap();
    db.insert_deposit(&new_deposit(Some("김양곤"), Some("mori"), true))
        .unwrap();

    assert_eq!(db.unchecked_count(None).unwrap(), 2);
    assert_eq!(db.unchecked_count(Some("아미")).unwrap(), 1);

    db.set_deposit_checked(first, true).unwrap();
    assert_eq!(db.unchecked_count(None).unwrap(), 1);
    assert_eq!(db.unchecked_count(Some("아미")).unwrap(), 0);

    assert!(matches!(
        db.set_deposit_checked(9999, true),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_delete_deposit() {
    let db = Database::in_memory().unwrap();
    let id = db
        .insert_deposit(&new_deposit(Some("신동수"), Some("아미"), true))
        .unwrap();

    db.delete_deposit(id).unwrap();
    assert!(db.get_deposit(id).unwrap().is_none());
    assert!(matches!(db.delete_deposit(id), Err(Error::NotFound(_))));
}

#[test]
fn test_deposit_companies_are_distinct_and_sorted() {
    let db = Database::in_memory().unwrap();
    assert!(db.deposit_companies().unwrap().is_empty());

    for company in [Some("아미"), Some("mori"), Some("아미"), Some(""), None] {
        db.insert_deposit(&new_deposit(Some("신동수"), company, true))
            .unwrap();
    }

    assert_eq!(db.deposit_companies().unwrap(), vec!["mori", "아미"]);
}

#[test]
fn test_delete_company_takes_its_deposits() {
    let db = Database::in_memory().unwrap();
    db.add_company("아미", true).unwrap();
    db.add_company("mori", true).unwrap();
    db.insert_deposit(&new_deposit(Some("신동수"), Some("아미"), true))
        .unwrap();
    db.insert_deposit(&new_deposit(Some("김양곤"), Some("아미"), false))
        .unwrap();
    db.insert_deposit(&new_deposit(Some("김양곤"), Some("mori"), true))
        .unwrap();

    assert_eq!(db.delete_company("아미").unwrap(), 2);
    assert_eq!(db.approved_companies().unwrap(), vec![ApprovedCompany::new("mori")]);
    assert_eq!(db.deposit_companies().unwrap(), vec!["mori"]);

    // Unregistered company: its ledger rows stay
    db.insert_deposit(&new_deposit(Some("홍길동"), Some("ghost"), true))
        .unwrap();
    assert!(matches!(db.delete_company("ghost"), Err(Error::NotFound(_))));
    assert_eq!(db.unchecked_count(Some("ghost")).unwrap(), 1);
}
