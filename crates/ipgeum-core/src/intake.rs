//! Deposit intake: decide whether a parse is good enough to record as a
//! successful deposit, and normalize it for the ledger.
//!
//! A failed evaluation is not an error. The raw text is still stored with
//! `parse_success = false` for manual review.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::matching::MatchingLookup;
use crate::models::{NewDeposit, ParsedTransaction, TransactionType};
use crate::parser::vocab::{DEPOSIT_KEYWORD, WITHDRAWAL_KEYWORDS};
use crate::parser::{parse_transaction_with, ParseOptions};

const STORED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

re!(re_month_day_time, r"^[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$");
re!(re_date_time_no_seconds, r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$");

/// Cheap pre-filter for inbound SMS: does the text mention any transaction
/// keyword at all?
pub fn has_transaction_keyword(text: &str) -> bool {
    text.contains(DEPOSIT_KEYWORD) || WITHDRAWAL_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// Normalize a parsed datetime string to a full timestamp.
///
/// `MM/DD HH:mm` gets `year` and `:00` seconds, `YYYY/MM/DD HH:mm` gets
/// `:00`. Date-only values cannot be normalized and yield `None`.
pub fn normalize_datetime(raw: &str, year: i32) -> Option<NaiveDateTime> {
    let mut value = raw.replace('/', "-").trim().to_string();

    if re_month_day_time().is_match(&value) {
        value = format!("{}-{}:00", year, value);
    } else if re_date_time_no_seconds().is_match(&value) {
        value.push_str(":00");
    }

    NaiveDateTime::parse_from_str(&value, STORED_DATETIME_FORMAT).ok()
}

/// A field that must be present for a parse to count as successful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Bank,
    Datetime,
    Amount,
    SenderName,
    TransactionType,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Datetime => "datetime",
            Self::Amount => "amount",
            Self::SenderName => "sender_name",
            Self::TransactionType => "transaction_type",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A successful parse in ledger form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDeposit {
    pub date: NaiveDateTime,
    pub bank: String,
    pub amount: i64,
    pub balance: Option<i64>,
    pub sender: String,
    /// Empty when no approved company was recognized
    pub company: String,
    pub transaction_type: TransactionType,
}

/// Result of [`evaluate`]
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeOutcome {
    pub parse_success: bool,
    pub deposit: Option<NormalizedDeposit>,
    pub missing: Vec<RequiredField>,
    /// Raw datetime that was present but could not be normalized
    pub rejected_datetime: Option<String>,
}

impl IntakeOutcome {
    /// Ledger row for this outcome. Failed parses keep only the raw text
    /// and the member flags.
    pub fn to_new_deposit(&self, sms_raw: &str, parsed: &ParsedTransaction) -> NewDeposit {
        match &self.deposit {
            Some(d) => NewDeposit {
                date: Some(d.date),
                bank: Some(d.bank.clone()),
                amount: Some(d.amount),
                balance: d.balance,
                sender: Some(d.sender.clone()),
                company: Some(d.company.clone()),
                transaction_type: d.transaction_type,
                sms_raw: sms_raw.to_string(),
                is_matching_member: parsed.is_matching_member,
                requires_new_alert: parsed.requires_new_alert,
                parse_success: true,
            },
            None => NewDeposit {
                date: None,
                bank: None,
                amount: None,
                balance: None,
                sender: None,
                company: None,
                transaction_type: TransactionType::Deposit,
                sms_raw: sms_raw.to_string(),
                is_matching_member: parsed.is_matching_member,
                requires_new_alert: parsed.requires_new_alert,
                parse_success: false,
            },
        }
    }
}

/// Check required fields and normalize a parse received at `now`
pub fn evaluate(parsed: &ParsedTransaction, now: NaiveDateTime) -> IntakeOutcome {
    let amount = parsed.amount.as_deref().and_then(|a| a.parse::<i64>().ok());

    let mut missing = Vec::new();
    if parsed.bank.is_none() {
        missing.push(RequiredField::Bank);
    }
    if parsed.datetime.is_none() {
        missing.push(RequiredField::Datetime);
    }
    if amount.is_none() {
        missing.push(RequiredField::Amount);
    }
    if parsed.sender_name.is_none() {
        missing.push(RequiredField::SenderName);
    }
    if parsed.transaction_type.is_none() {
        missing.push(RequiredField::TransactionType);
    }

    let failed = |missing: Vec<RequiredField>, rejected_datetime: Option<String>| IntakeOutcome {
        parse_success: false,
        deposit: None,
        missing,
        rejected_datetime,
    };

    let (Some(bank), Some(raw_date), Some(amount), Some(sender), Some(kind)) = (
        parsed.bank.as_ref(),
        parsed.datetime.as_ref(),
        amount,
        parsed.sender_name.as_ref(),
        parsed.transaction_type,
    ) else {
        warn!(
            missing = ?missing.iter().map(RequiredField::as_str).collect::<Vec<_>>(),
            "Required fields missing from parse"
        );
        return failed(missing, None);
    };

    let Some(date) = normalize_datetime(raw_date, now.year()) else {
        warn!(original = %raw_date, "Could not normalize transaction datetime");
        return failed(missing, Some(raw_date.clone()));
    };

    IntakeOutcome {
        parse_success: true,
        deposit: Some(NormalizedDeposit {
            date,
            bank: bank.clone(),
            amount,
            balance: parsed.balance.as_deref().and_then(|b| b.parse().ok()),
            sender: sender.clone(),
            company: parsed.company.clone().unwrap_or_default(),
            transaction_type: kind,
        }),
        missing,
        rejected_datetime: None,
    }
}

/// A stored message and how it was judged
#[derive(Debug, Clone)]
pub struct Ingested {
    pub id: i64,
    pub parsed: ParsedTransaction,
    pub outcome: IntakeOutcome,
}

/// Parse, evaluate and store one message received at `now`.
///
/// Failed parses are stored too, with `parse_success = false`. Messages
/// without a date in `options` are parsed against `now`'s date.
pub async fn ingest(
    db: &Database,
    text: &str,
    lookup: &dyn MatchingLookup,
    options: &ParseOptions,
    now: NaiveDateTime,
) -> Result<Ingested> {
    let companies = db.approved_companies()?;
    let options = ParseOptions {
        today: Some(options.today.unwrap_or_else(|| now.date())),
        ..*options
    };

    let parsed = parse_transaction_with(text, &companies, Some(lookup), &options).await;
    let outcome = evaluate(&parsed, now);
    let id = db.insert_deposit(&outcome.to_new_deposit(text, &parsed))?;

    if outcome.parse_success {
        info!(
            id,
            company = parsed.company.as_deref().unwrap_or(""),
            requires_new_alert = parsed.requires_new_alert,
            "Deposit stored"
        );
    } else {
        warn!(
            id,
            missing = ?outcome.missing,
            rejected_datetime = ?outcome.rejected_datetime,
            "Stored unparsed message for review"
        );
    }

    Ok(Ingested {
        id,
        parsed,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MemberDirectory;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 4)
            .unwrap()
            .and_hms_opt(15, 20, 0)
            .unwrap()
    }

    fn complete() -> ParsedTransaction {
        ParsedTransaction {
            bank: Some("농협".into()),
            datetime: Some("07/04 15:18".into()),
            transaction_type: Some(TransactionType::Deposit),
            amount: Some("10000".into()),
            sender_name: Some("신동수".into()),
            balance: Some("3710000".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_has_transaction_keyword() {
        assert!(has_transaction_keyword("입금 1원"));
        assert!(has_transaction_keyword("ATM 인출"));
        assert!(!has_transaction_keyword("인증번호 123456"));
    }

    #[test]
    fn test_normalize_month_day_time() {
        let date = normalize_datetime("07/04 15:18", 2025).unwrap();
        assert_eq!(date.to_string(), "2025-07-04 15:18:00");
    }

    #[test]
    fn test_normalize_full_date_without_seconds() {
        let date = normalize_datetime("2024/12/31 23:59", 2025).unwrap();
        assert_eq!(date.to_string(), "2024-12-31 23:59:00");
    }

    #[test]
    fn test_normalize_full_datetime() {
        let date = normalize_datetime(" 2025/07/04 17:15:32 ", 2025).unwrap();
        assert_eq!(date.to_string(), "2025-07-04 17:15:32");
    }

    #[test]
    fn test_normalize_rejects_date_only_and_invalid() {
        assert!(normalize_datetime("07/04", 2025).is_none());
        assert!(normalize_datetime("13/45 25:99", 2025).is_none());
        assert!(normalize_datetime("", 2025).is_none());
    }

    #[test]
    fn test_evaluate_success() {
        let outcome = evaluate(&complete(), now());
        assert!(outcome.parse_success);
        assert!(outcome.missing.is_empty());

        let deposit = outcome.deposit.unwrap();
        assert_eq!(deposit.amount, 10000);
        assert_eq!(deposit.balance, Some(3710000));
        assert_eq!(deposit.company, "");
        assert_eq!(deposit.date.to_string(), "2025-07-04 15:18:00");
        assert_eq!(deposit.transaction_type.code(), 1);
    }

    #[test]
    fn test_evaluate_reports_missing_fields() {
        let parsed = ParsedTransaction {
            bank: Some("농협".into()),
            transaction_type: Some(TransactionType::Deposit),
            ..Default::default()
        };
        let outcome = evaluate(&parsed, now());
        assert!(!outcome.parse_success);
        assert_eq!(
            outcome.missing,
            vec![
                RequiredField::Datetime,
                RequiredField::Amount,
                RequiredField::SenderName
            ]
        );
    }

    #[test]
    fn test_evaluate_rejects_date_only() {
        let parsed = ParsedTransaction {
            datetime: Some("07/04".into()),
            ..complete()
        };
        let outcome = evaluate(&parsed, now());
        assert!(!outcome.parse_success);
        assert!(outcome.missing.is_empty());
        assert_eq!(outcome.rejected_datetime.as_deref(), Some("07/04"));
    }

    #[test]
    fn test_failed_outcome_still_builds_ledger_row() {
        let parsed = ParsedTransaction {
            requires_new_alert: true,
            ..Default::default()
        };
        let outcome = evaluate(&parsed, now());
        let row = outcome.to_new_deposit("알 수 없는 문자", &parsed);
        assert!(!row.parse_success);
        assert_eq!(row.sms_raw, "알 수 없는 문자");
        assert_eq!(row.transaction_type, TransactionType::Deposit);
        assert!(row.requires_new_alert);
        assert!(row.bank.is_none());
    }

    #[test]
    fn test_withdrawal_code() {
        let parsed = ParsedTransaction {
            transaction_type: Some(TransactionType::Withdrawal),
            ..complete()
        };
        let row = evaluate(&parsed, now()).to_new_deposit("sms", &parsed);
        assert_eq!(row.transaction_type.code(), 0);
        assert_eq!(row.company.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_ingest_stores_member_deposit() {
        let db = Database::in_memory().unwrap();
        db.add_company("아미", true).unwrap();
        let mut directory = MemberDirectory::new();
        directory.add("아미", "신동수");

        let text = "농협 입금10,000원\n07/04 15:18 352-****-4273-63 신동수 잔액3,710,000원\n아미";
        let ingested = ingest(&db, text, &directory, &ParseOptions::default(), now())
            .await
            .unwrap();

        assert!(ingested.outcome.parse_success);
        assert!(ingested.parsed.is_matching_member);
        let stored = db.get_deposit(ingested.id).unwrap().unwrap();
        assert_eq!(stored.amount, Some(10000));
        assert_eq!(stored.company.as_deref(), Some("아미"));
        assert_eq!(stored.date, Some(now().date().and_hms_opt(15, 18, 0).unwrap()));
        assert!(stored.is_matching_member);
        assert!(!stored.requires_new_alert);
    }

    #[tokio::test]
    async fn test_ingest_keeps_unparsed_text() {
        let db = Database::in_memory().unwrap();
        let directory = MemberDirectory::new();

        let ingested = ingest(&db, "입금 예정 안내", &directory, &ParseOptions::default(), now())
            .await
            .unwrap();

        assert!(!ingested.outcome.parse_success);
        let stored = db.get_deposit(ingested.id).unwrap().unwrap();
        assert!(!stored.parse_success);
        assert_eq!(stored.sms_raw, "입금 예정 안내");
    }
}
