//! Integration tests for ipgeum-core
//!
//! These tests exercise the full parse → evaluate → store workflow.

use chrono::NaiveDate;
use ipgeum_core::{
    db::Database,
    intake::evaluate,
    models::{DepositFilter, TransactionType},
    parse_transaction_with, LookupFailurePolicy, ParseOptions,
};

fn options() -> ParseOptions {
    ParseOptions {
        today: NaiveDate::from_ymd_opt(2025, 7, 4),
        on_lookup_error: LookupFailurePolicy::Suppress,
    }
}

fn received_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 4)
        .and_then(|d| d.and_hms_opt(15, 20, 0))
        .expect("valid timestamp")
}

// =============================================================================
// Parse → store workflow
// =============================================================================

#[tokio::test]
async fn test_known_member_deposit_workflow() {
    let db = Database::in_memory().expect("Failed to create database");
    db.add_company("아미", true).unwrap();
    db.add_matching_member("아미", "신동수").unwrap();

    let sms = "농협 입금10,000원\n07/04 15:18 352-****-4273-63 신동수 잔액3,710,000원\n아미";
    let companies = db.approved_companies().unwrap();

    let parsed = parse_transaction_with(sms, &companies, Some(&db), &options()).await;
    assert_eq!(parsed.company.as_deref(), Some("아미"));
    assert_eq!(parsed.sender_name.as_deref(), Some("신동수"));
    assert!(parsed.is_matching_member);
    assert!(!parsed.requires_new_alert);

    let outcome = evaluate(&parsed, received_at());
    assert!(outcome.parse_success);

    let id = db
        .insert_deposit(&outcome.to_new_deposit(sms, &parsed))
        .unwrap();
    let stored = db.get_deposit(id).unwrap().unwrap();
    assert_eq!(stored.amount, Some(10000));
    assert_eq!(stored.balance, Some(3710000));
    assert_eq!(stored.company.as_deref(), Some("아미"));
    assert_eq!(
        stored.date.map(|d| d.to_string()).as_deref(),
        Some("2025-07-04 15:18:00")
    );
    assert!(stored.is_matching_member);
}

#[tokio::test]
async fn test_unknown_depositor_raises_alert() {
    let db = Database::in_memory().unwrap();
    db.add_company("아미", true).unwrap();

    let sms = "농협 입금10,000원\n07/04 15:18 352-****-4273-63 홍길동 잔액3,710,000원\n아미";
    let companies = db.approved_companies().unwrap();
    let parsed = parse_transaction_with(sms, &companies, Some(&db), &options()).await;

    assert!(!parsed.is_matching_member);
    assert!(parsed.requires_new_alert);
}

#[tokio::test]
async fn test_unapproved_company_is_not_attached() {
    let db = Database::in_memory().unwrap();
    db.add_company("아미", false).unwrap();
    db.add_matching_member("아미", "신동수").unwrap();

    let sms = "농협 입금10,000원\n07/04 15:18 352-****-4273-63 신동수 잔액3,710,000원\n아미";
    let companies = db.approved_companies().unwrap();
    let parsed = parse_transaction_with(sms, &companies, Some(&db), &options()).await;

    assert!(parsed.company.is_none());
    assert!(!parsed.is_matching_member);
    assert!(!parsed.requires_new_alert);
}

#[tokio::test]
async fn test_unparseable_message_kept_for_review() {
    let db = Database::in_memory().unwrap();
    let sms = "입금 안내드립니다";

    let parsed = parse_transaction_with(sms, &[], Some(&db), &options()).await;
    assert_eq!(parsed.transaction_type, Some(TransactionType::Deposit));

    let outcome = evaluate(&parsed, received_at());
    assert!(!outcome.parse_success);
    db.insert_deposit(&outcome.to_new_deposit(sms, &parsed))
        .unwrap();

    let rows = db.list_deposits(&DepositFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].parse_success);
    assert_eq!(rows[0].sms_raw, sms);
    assert_eq!(db.unchecked_count(None).unwrap(), 1);
}

// =============================================================================
// Encryption
// =============================================================================

#[test]
fn test_encrypted_database_reopens_with_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ipgeum.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_with_key(path, Some("correct horse")).unwrap();
        db.add_company("아미", true).unwrap();
    }

    let db = Database::new_with_key(path, Some("correct horse")).unwrap();
    assert!(db.is_encrypted());
    assert_eq!(db.approved_companies().unwrap().len(), 1);

    assert!(Database::new_with_key(path, Some("wrong key")).is_err());
}
