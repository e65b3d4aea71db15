//! Bank and company identification

use tracing::debug;

use super::vocab::BANK_NAMES;
use crate::models::ApprovedCompany;

re!(re_bracket_tag, r"\[([^\]]+)\]");

/// Resolve the canonical bank name.
///
/// Bracketed tags such as `[KB]` or `[한국투자]` are checked first; only when
/// none of them names a bank is the whole text scanned.
pub fn extract_bank(text: &str) -> Option<String> {
    for caps in re_bracket_tag().captures_iter(text) {
        let Some(tag) = caps.get(1) else { continue };
        if let Some(bank) = find_bank_token(tag.as_str()) {
            debug!(bank, tag = tag.as_str(), "Bank resolved from bracket tag");
            return Some(bank.to_string());
        }
    }

    find_bank_token(text).map(str::to_string)
}

fn find_bank_token(haystack: &str) -> Option<&'static str> {
    let haystack = haystack.to_lowercase();
    BANK_NAMES
        .iter()
        .copied()
        .find(|bank| haystack.contains(&bank.to_lowercase()))
}

/// Resolve the company (category) identifier against the approved list.
///
/// Companies put their identifier on the last line of the message, so that
/// line is tried first: exact match, then containment either way. The whole
/// text is searched last.
pub fn extract_company(text: &str, companies: &[ApprovedCompany]) -> Option<String> {
    let names: Vec<&str> = companies
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }

    if let Some(last_line) = last_non_empty_line(text) {
        let last_lower = last_line.to_lowercase();
        if let Some(name) = names.iter().find(|name| name.to_lowercase() == last_lower) {
            return Some(name.to_string());
        }

        // Suffixed variants: "ABC2" on the last line still belongs to "ABC"
        if let Some(name) = names
            .iter()
            .find(|name| last_line.contains(**name) || name.contains(last_line))
        {
            return Some(name.to_string());
        }
    }

    let text_lower = text.to_lowercase();
    names
        .iter()
        .find(|name| text_lower.contains(&name.to_lowercase()))
        .map(|name| name.to_string())
}

fn last_non_empty_line(text: &str) -> Option<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn companies(names: &[&str]) -> Vec<ApprovedCompany> {
        names.iter().map(|n| ApprovedCompany::new(*n)).collect()
    }

    #[test]
    fn test_bank_from_plain_text() {
        assert_eq!(
            extract_bank("농협 입금10,000원").as_deref(),
            Some("농협")
        );
    }

    #[test]
    fn test_bank_bracket_beats_plain_text() {
        // 농협 is earlier in the vocabulary, but the bracketed tag wins
        let text = "농협 계좌 안내\n[KB]07/07 18:29\n출금";
        assert_eq!(extract_bank(text).as_deref(), Some("KB"));
    }

    #[test]
    fn test_bank_bracket_without_bank_falls_back() {
        let text = "[Web발신]\n신한07/04 15:18";
        assert_eq!(extract_bank(text).as_deref(), Some("신한"));
    }

    #[test]
    fn test_bank_case_insensitive() {
        assert_eq!(extract_bank("[kb]07/07").as_deref(), Some("KB"));
    }

    #[test]
    fn test_bank_declaration_order_wins() {
        // Both 신한 and 신한은행 match; the earlier entry is returned
        assert_eq!(extract_bank("신한은행 입금").as_deref(), Some("신한"));
    }

    #[test]
    fn test_bank_absent() {
        assert_eq!(extract_bank("hello world"), None);
    }

    #[test]
    fn test_company_exact_last_line_beats_substring() {
        let list = companies(&["ABC", "ABC2"]);
        let text = "농협 입금1,000원\nABC2";
        assert_eq!(extract_company(text, &list).as_deref(), Some("ABC2"));
    }

    #[test]
    fn test_company_exact_is_case_insensitive() {
        let list = companies(&["Mori114"]);
        assert_eq!(
            extract_company("입금\nmori114  ", &list).as_deref(),
            Some("Mori114")
        );
    }

    #[test]
    fn test_company_suffixed_last_line() {
        let list = companies(&["abs"]);
        assert_eq!(
            extract_company("입금 1원\nabs2", &list).as_deref(),
            Some("abs")
        );
    }

    #[test]
    fn test_company_full_text_fallback() {
        let list = companies(&["coin1147"]);
        let text = "COIN1147 입금 5,000원\n신동수";
        assert_eq!(extract_company(text, &list).as_deref(), Some("coin1147"));
    }

    #[test]
    fn test_company_requires_list() {
        assert_eq!(extract_company("입금\n아미", &[]), None);
    }

    #[test]
    fn test_company_whitespace_only_text() {
        let list = companies(&["아미"]);
        assert_eq!(extract_company("  \n \n", &list), None);
    }
}
