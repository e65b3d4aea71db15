//! Bank notification parser
//!
//! Turns one raw SMS or push-notification body into a [`ParsedTransaction`].
//! Every field is extracted independently and best-effort: a miss leaves the
//! field absent and never stops the other extractors. The only suspension
//! point is the optional matching-member lookup for deposits.

pub mod amount;
pub mod datetime;
pub mod institution;
pub mod sender;
pub mod vocab;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::matching::{LookupFailurePolicy, MatchingLookup};
use crate::models::{ApprovedCompany, ParsedTransaction};

pub use amount::{classify, extract_amount, extract_balance};
pub use datetime::extract_datetime;
pub use institution::{extract_bank, extract_company};
pub use sender::extract_sender;

/// Knobs for [`parse_transaction_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Date used for time-only messages; defaults to the local date
    pub today: Option<NaiveDate>,
    pub on_lookup_error: LookupFailurePolicy,
}

/// Parse without a member lookup, using the local date
pub fn parse_text(text: &str, companies: &[ApprovedCompany]) -> ParsedTransaction {
    parse_text_on(text, companies, Local::now().date_naive())
}

/// Parse without a member lookup.
///
/// Pure and deterministic for a given `today`.
pub fn parse_text_on(
    text: &str,
    companies: &[ApprovedCompany],
    today: NaiveDate,
) -> ParsedTransaction {
    let mut parsed = ParsedTransaction {
        bank: extract_bank(text),
        company: extract_company(text, companies),
        datetime: extract_datetime(text, today),
        transaction_type: classify(text),
        ..Default::default()
    };

    // Unclassified text is not guessed at
    if let Some(kind) = parsed.transaction_type {
        parsed.amount = extract_amount(text, kind);
    }

    parsed.sender_name = extract_sender(text, parsed.transaction_type, companies)
        .and_then(|name| strip_company(name, parsed.company.as_deref()));
    parsed.balance = extract_balance(text);

    debug!(
        bank = ?parsed.bank,
        company = ?parsed.company,
        transaction_type = ?parsed.transaction_type,
        amount = ?parsed.amount,
        sender = ?parsed.sender_name,
        "Parsed notification"
    );

    parsed
}

/// Parse a notification, consulting `lookup` for deposits.
///
/// Lookup failures are logged and mapped to the fail-safe default
/// (`is_matching_member = false`, `requires_new_alert = false`).
pub async fn parse_transaction(
    text: &str,
    companies: &[ApprovedCompany],
    lookup: Option<&dyn MatchingLookup>,
) -> ParsedTransaction {
    parse_transaction_with(text, companies, lookup, &ParseOptions::default()).await
}

/// [`parse_transaction`] with explicit options
pub async fn parse_transaction_with(
    text: &str,
    companies: &[ApprovedCompany],
    lookup: Option<&dyn MatchingLookup>,
    options: &ParseOptions,
) -> ParsedTransaction {
    let today = options.today.unwrap_or_else(|| Local::now().date_naive());
    let mut parsed = parse_text_on(text, companies, today);

    if !parsed.is_deposit() {
        return parsed;
    }
    let (Some(company), Some(sender), Some(lookup)) =
        (parsed.company.as_deref(), parsed.sender_name.as_deref(), lookup)
    else {
        return parsed;
    };

    let (is_member, requires_alert) = match lookup.is_matching_member(company, sender).await {
        Ok(is_member) => (is_member, !is_member),
        Err(e) => {
            warn!(
                company,
                sender,
                policy = %options.on_lookup_error,
                "Matching member lookup failed: {}",
                e
            );
            options.on_lookup_error.flags()
        }
    };

    parsed.is_matching_member = is_member;
    parsed.requires_new_alert = requires_alert;
    parsed
}

/// Company identifiers sometimes leak into the name capture
fn strip_company(name: String, company: Option<&str>) -> Option<String> {
    let company = match company {
        Some(c) if !c.is_empty() && name.contains(c) => c,
        _ => return Some(name),
    };

    // Same as removing every `\s*company\s*` run
    let joined: String = name.split(company).map(str::trim).collect();
    let stripped = joined.trim().to_string();

    (!stripped.is_empty()).then_some(stripped)
}
