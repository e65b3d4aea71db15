//! Counterparty name extraction
//!
//! Banks put the depositor or payee name in very different places, so
//! extraction walks ordered candidate tables anchored on masked account
//! numbers, keyword positions and line boundaries. Each raw capture then runs
//! through [`CLEANUP_PIPELINE`]; the first candidate that survives wins.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::vocab::{MIN_NAME_CHARS, SENDER_NOISE_TOKENS, TRAILING_TAG_MAX_CHARS};
use crate::models::{ApprovedCompany, TransactionType};

re_list!(withdrawal_patterns, [
    // KB: merchant on the line after the masked account
    r"[0-9]{6}\*+[0-9]{3}\n([가-힣A-Z0-9\s]+?)(?:\n출금|\n[0-9]|\n잔액|$)",
    r"출금\s+[0-9,]+원\s+([가-힣\s]+?)(?:\s*잔액|$)",
    r"출금\s+[0-9,]+\s+([가-힣\s]+?)(?:\s*잔액|$)",
    r"[0-9]{2}:[0-9]{2}\s+[0-9]{3}-\*{4}-[0-9]{4}-[0-9]{2}\s+([가-힣\s()]+?)(?:\s*잔액|$)",
    r"\n([가-힣\s]+)\n출금",
    r"\n([가-힣\s]+)\n[0-9]",
    // corporate payees at the end of a line
    r"(?m)\n\s*([가-힣\s()]+(?:주식회사|\(주\)|\(유\)|\(합\)|\(사\)|\(회사\))?)\s*$",
    r"\n\s*([가-힣\s()]+(?:주식회사|\(주\)|\(유\)|\(합\)|\(사\)|\(회사\))?)\s*\n",
    r"출금\s+[0-9,]+\s*\n\s*([가-힣\s()]+)",
    // Hana: 이체출금 / amount / (잔액..) / name
    r"이체출금\s*\n\s*[0-9,]+\s*원\s*\n\s*\(잔액[0-9,]+\)\s*\n\s*([가-힣\s]+)",
    r"\n\s*([가-힣\s]+)\s*$",
]);

re_list!(deposit_patterns, [
    r"[0-9]{6}\*+[0-9]{3}\n([가-힣A-Z0-9\s]+?)(?:\n입금|\n[0-9]|\n잔액|$)",
    // Shinhan: amount, balance, then the name
    r"입금\s+[0-9,]+\s*\n\s*잔액\s*[0-9,]+\s*\n\s*([가-힣A-Z0-9\s]+?)(?:\n|$)",
    // Saemaeul
    r"이체입금\s*\n\s*([가-힣\s()]+?)(?:\s*잔액|$)",
    r"이체입금\s+([가-힣\s()]+?)(?:\s*잔액|$)",
    r"새마을금\s+([가-힣\s()]+?)(?:\s*아미|$)",
    r"새마을금\s+([가-힣\s()]+?)\s*$",
    // after a masked account: branch-coded, plain, latin
    r"[0-9]{3}-\*{4}-[0-9]{4}-[0-9]{2}\s+([0-9]{3}-[가-힣]+)",
    r"[0-9]{3}-\*{4}-[0-9]{4}-[0-9]{2}\s+([가-힣\s()]+)",
    r"[0-9]{3}-\*{4}-[0-9]{4}-[0-9]{2}\s+([a-zA-Z0-9]+)",
    r"입금\s+[0-9,]+원\s+([가-힣\s()]+?)(?:\s*잔액|$)",
    r"입금\s+[0-9,]+\s+([가-힣\s()]+?)(?:\s*잔액|$)",
    r"(?m)\n\s*([가-힣\s()]+)\s*$",
    r"\n([가-힣\s()]+)\n입금",
    r"\n([가-힣\s()]+)\n[0-9]+$",
    r"\n([가-힣\s()]+)\n[0-9]+\n",
    r"[0-9]+\*+[0-9]+\n([가-힣\s()]+)",
    r"[0-9]{3}-[0-9]{3}-[0-9]{4}-[0-9]{2}\s+([0-9가-힣\s()\-]+)",
    r"[0-9]{3}-\*{4}-[0-9]{4}-[0-9]{2}\s+([0-9가-힣\s()\-]+)",
    // bare Korean name before a long account number or the end
    r"([가-힣\s()]{2,10})(?:\s*[0-9]{10,}|\s*$)",
]);

re!(re_trailing_keyword, r"\s*(잔액|출금|입금|이체).*$");
re!(re_dangling_paren, r"\(+$");
re!(re_branch_code, r"^[0-9]{3}-([가-힣]+)");
re!(re_teller_account, r"^[0-9]+-[0-9]+-[0-9]+-[0-9]+\s+([가-힣]+)");

fn noise_token_patterns() -> &'static [Regex] {
    static R: OnceLock<Vec<Regex>> = OnceLock::new();
    R.get_or_init(|| {
        SENDER_NOISE_TOKENS
            .iter()
            .map(|token| {
                Regex::new(&format!(r"(^|\s){}(\s|$)", regex::escape(token)))
                    .expect("invalid noise token pattern")
            })
            .collect()
    })
}

/// One cleanup step: takes the current name and the approved company names
type CleanupStep = fn(&str, &[&str]) -> String;

/// Applied in order to every candidate that passes [`is_plausible`]
pub const CLEANUP_PIPELINE: &[(&str, CleanupStep)] = &[
    ("strip_trailing_keywords", strip_trailing_keywords),
    ("join_lines", join_lines),
    ("strip_dangling_paren", strip_dangling_paren),
    ("remove_noise_tokens", remove_noise_tokens),
    ("drop_trailing_tag", drop_trailing_tag),
    ("strip_branch_code", strip_branch_code),
];

/// Extract the counterparty name.
///
/// Withdrawal templates are tried before the generic deposit ones when the
/// message was classified as a withdrawal. Candidates that do not survive
/// cleanup are discarded and never reported.
pub fn extract_sender(
    text: &str,
    kind: Option<TransactionType>,
    companies: &[ApprovedCompany],
) -> Option<String> {
    let names: Vec<&str> = companies
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    let withdrawal_first: &[Regex] = if kind == Some(TransactionType::Withdrawal) {
        withdrawal_patterns()
    } else {
        &[]
    };

    for (index, re) in withdrawal_first
        .iter()
        .chain(deposit_patterns())
        .enumerate()
    {
        let Some(capture) = re.captures(text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let raw = capture.as_str().trim();
        if !is_plausible(raw) {
            continue;
        }

        let cleaned = clean_candidate(raw, &names);
        if char_len(&cleaned) >= MIN_NAME_CHARS {
            debug!(pattern = index, sender = %cleaned, "Sender resolved");
            return Some(cleaned);
        }
        debug!(pattern = index, raw, "Sender candidate rejected after cleanup");
    }

    None
}

/// Run a raw capture through [`CLEANUP_PIPELINE`]
pub fn clean_candidate(raw: &str, companies: &[&str]) -> String {
    CLEANUP_PIPELINE
        .iter()
        .fold(raw.trim().to_string(), |name, (_, step)| step(&name, companies))
}

/// Reject captures that are too short or purely numeric
pub fn is_plausible(candidate: &str) -> bool {
    char_len(candidate) >= MIN_NAME_CHARS && !candidate.chars().all(|c| c.is_ascii_digit())
}

fn strip_trailing_keywords(name: &str, _: &[&str]) -> String {
    re_trailing_keyword().replace(name, "").trim().to_string()
}

fn join_lines(name: &str, _: &[&str]) -> String {
    name.replace('\n', " ").trim().to_string()
}

fn strip_dangling_paren(name: &str, _: &[&str]) -> String {
    re_dangling_paren().replace(name, "").trim().to_string()
}

/// Remove bank tokens only where they stand as whole words
fn remove_noise_tokens(name: &str, _: &[&str]) -> String {
    noise_token_patterns()
        .iter()
        .fold(name.to_string(), |acc, re| {
            re.replace_all(&acc, "${1}${2}").trim().to_string()
        })
}

/// Drop a short trailing word that is not an approved company.
///
/// Channel or system tags ("웹뱅", "모바일") trail the name in several
/// templates. This also truncates genuine two-word names whose last word is
/// short, so it only runs when a company list was supplied.
fn drop_trailing_tag(name: &str, companies: &[&str]) -> String {
    if companies.is_empty() {
        return name.to_string();
    }

    let mut words: Vec<&str> = name.split_whitespace().collect();
    let Some(last) = words.last().copied() else {
        return name.to_string();
    };
    if words.len() < 2 {
        return name.to_string();
    }

    let is_company = companies
        .iter()
        .any(|company| *company == last || last.contains(company));
    if is_company || char_len(last) > TRAILING_TAG_MAX_CHARS {
        return name.to_string();
    }

    words.pop();
    words.join(" ")
}

/// `020-이순일` and `088-123-4567-01 조휘서` carry a branch or teller prefix
fn strip_branch_code(name: &str, _: &[&str]) -> String {
    re_branch_code()
        .captures(name)
        .or_else(|| re_teller_account().captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| name.to_string())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
