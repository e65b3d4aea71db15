//! Domain models for ipgeum

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a bank notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }

    /// Storage code used by the deposits ledger (deposit = 1, withdrawal = 0)
    pub fn code(&self) -> i64 {
        match self {
            Self::Deposit => 1,
            Self::Withdrawal => 0,
        }
    }

    pub fn from_code(code: i64) -> Self {
        if code == 0 {
            Self::Withdrawal
        } else {
            Self::Deposit
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" | "입금" => Ok(Self::Deposit),
            "withdrawal" | "출금" => Ok(Self::Withdrawal),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured candidate extracted from one notification text
///
/// Every field is best-effort. Optional string fields are omitted from JSON
/// when absent; `transaction_type` is always present and `null` when the text
/// could not be classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// `YYYY/MM/DD HH:mm[:ss]`, `MM/DD HH:mm` or `MM/DD`, as found in the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// ASCII digits only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// ASCII digits only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default)]
    pub is_matching_member: bool,
    #[serde(default)]
    pub requires_new_alert: bool,
}

impl ParsedTransaction {
    /// True when nothing at all was extracted
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_deposit(&self) -> bool {
        self.transaction_type == Some(TransactionType::Deposit)
    }
}

/// A company identifier the parser may attach to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedCompany {
    pub name: String,
}

impl ApprovedCompany {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&str> for ApprovedCompany {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A stored company (tenant / category)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// A registered member of a category
///
/// Deposits are matched on `account_holder`, the name the bank prints.
/// `member_name` is how operators know the member and is unique per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingMember {
    pub id: i64,
    pub category: String,
    pub member_name: String,
    pub account_holder: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Matching member to create, or the full replacement on update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatchingMember {
    pub category: String,
    pub member_name: String,
    pub account_holder: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

impl NewMatchingMember {
    /// A member known by their account holder name
    pub fn new(category: impl Into<String>, account_holder: impl Into<String>) -> Self {
        let account_holder = account_holder.into();
        Self {
            category: category.into(),
            member_name: account_holder.clone(),
            account_holder,
            ..Default::default()
        }
    }
}

/// Deposit ledger row to insert
///
/// Unparsed messages are still stored: every extracted column may be empty
/// while `sms_raw` always carries the original text.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeposit {
    pub date: Option<NaiveDateTime>,
    pub bank: Option<String>,
    pub amount: Option<i64>,
    pub balance: Option<i64>,
    pub sender: Option<String>,
    pub company: Option<String>,
    pub transaction_type: TransactionType,
    pub sms_raw: String,
    pub is_matching_member: bool,
    pub requires_new_alert: bool,
    pub parse_success: bool,
}

/// A stored deposit ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: i64,
    pub date: Option<NaiveDateTime>,
    pub bank: Option<String>,
    pub amount: Option<i64>,
    pub balance: Option<i64>,
    pub sender: Option<String>,
    pub company: Option<String>,
    pub transaction_type: TransactionType,
    pub sms_raw: String,
    pub is_matching_member: bool,
    pub requires_new_alert: bool,
    pub parse_success: bool,
    pub is_checked: bool,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing deposits
#[derive(Debug, Clone, Default)]
pub struct DepositFilter {
    pub company: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
