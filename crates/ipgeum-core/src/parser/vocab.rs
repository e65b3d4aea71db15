//! Ordered vocabularies used by the extraction rules
//!
//! Order is significant everywhere in this module: lookups walk the lists
//! front to back and the first hit wins.

/// Bank name tokens, matched case-insensitively as substrings.
///
/// Earlier entries win ties, so `신한` shadows `신한은행` and `카카오`
/// shadows `카카오뱅크`.
pub const BANK_NAMES: &[&str] = &[
    "한국투자",
    "농협",
    "NH",
    "신협",
    "우리",
    "기업",
    "IBK",
    "신한",
    "신한은행",
    "국민",
    "국민은행",
    "KB",
    "새마을",
    "토스",
    "카카오",
    "케이",
    "케이뱅크",
    "카카오뱅크",
    "토스뱅크",
];

/// Institution tokens removed from a captured counterparty name when they
/// appear as a whole word.
pub const SENDER_NOISE_TOKENS: &[&str] = &[
    "시티",
    "신한",
    "국민",
    "농협",
    "우리",
    "기업",
    "IBK",
    "KB",
    "토스",
    "카카오",
    "케이",
    "새마을",
    "새마을금",
    "하나은행",
];

pub const DEPOSIT_KEYWORD: &str = "입금";

/// Withdrawal, transfer, remittance and cash-withdrawal keywords
pub const WITHDRAWAL_KEYWORDS: &[&str] = &["출금", "이체", "송금", "인출"];

/// Longest trailing word treated as a channel/system tag in sender names
pub const TRAILING_TAG_MAX_CHARS: usize = 4;

/// Minimum length of an accepted sender name
pub const MIN_NAME_CHARS: usize = 2;
