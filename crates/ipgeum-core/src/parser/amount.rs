//! Direction classification, amount and balance extraction

use regex::Regex;

use super::vocab::{DEPOSIT_KEYWORD, WITHDRAWAL_KEYWORDS};
use crate::models::TransactionType;

re_list!(deposit_amount_patterns, [
    r"입금\s*([0-9,]+)원",      // 입금10,000원, 입금 1000000원
    r"입금\s+([0-9,]+)",        // 입금     100,000
    r"입금\s*\n([0-9,]+)",      // 입금\n600,000
    r"([0-9,]+)원",             // keyword on a separate line
]);

re_list!(withdrawal_amount_patterns, [
    r"출금\s*([0-9,]+)원",
    r"출금\s+([0-9,]+)",
    r"출금\s*\n([0-9,]+)",
    r"이체\s*([0-9,]+)원",
    r"송금\s*([0-9,]+)원",
    r"인출\s*([0-9,]+)원",
    r"([0-9,]+)원",
]);

re_list!(balance_patterns, [
    r"잔액\s*([0-9,]+)원",        // 잔액3,710,000원
    r"잔액\s*:\s*([0-9,]+)원",    // 잔액: 1,250,000원
    r"잔액\s+([0-9,]+)",          // 잔액 500,000
    r"잔액\s*([0-9,]+)",          // 잔액560,000
    r"\n([0-9,]+)\s*잔액",        // 11,040,045 잔액
    r"\n([0-9,]+)\n잔액",         // 560,000\n잔액
]);

/// Classify direction by keyword presence. The deposit keyword is checked
/// first and always wins.
pub fn classify(text: &str) -> Option<TransactionType> {
    if text.contains(DEPOSIT_KEYWORD) {
        Some(TransactionType::Deposit)
    } else if WITHDRAWAL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        Some(TransactionType::Withdrawal)
    } else {
        None
    }
}

/// Extract the unsigned amount for an already classified message
pub fn extract_amount(text: &str, kind: TransactionType) -> Option<String> {
    let patterns = match kind {
        TransactionType::Deposit => deposit_amount_patterns(),
        TransactionType::Withdrawal => withdrawal_amount_patterns(),
    };
    first_number(text, patterns)
}

/// Extract the post-transaction balance, label before or after the number
pub fn extract_balance(text: &str) -> Option<String> {
    first_number(text, balance_patterns())
}

/// First pattern whose capture holds at least one digit, commas stripped
fn first_number(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        let raw = re.captures(text)?.get(1)?.as_str();
        let digits = raw.replace(',', "");
        (!digits.is_empty()).then_some(digits)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_deposit() {
        assert_eq!(classify("농협 입금10,000원"), Some(TransactionType::Deposit));
    }

    #[test]
    fn test_classify_withdrawal_keywords() {
        for text in ["출금 1원", "이체 1원", "송금 1원", "인출 1원"] {
            assert_eq!(classify(text), Some(TransactionType::Withdrawal), "{text}");
        }
    }

    #[test]
    fn test_classify_deposit_wins_over_withdrawal() {
        assert_eq!(classify("이체입금\n400,000원"), Some(TransactionType::Deposit));
        assert_eq!(classify("출금 취소 후 입금"), Some(TransactionType::Deposit));
    }

    #[test]
    fn test_classify_none() {
        assert_eq!(classify("안녕하세요 공지사항입니다"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_deposit_amount_with_won() {
        assert_eq!(
            extract_amount("농협 입금10,000원", TransactionType::Deposit).as_deref(),
            Some("10000")
        );
    }

    #[test]
    fn test_deposit_amount_padded_without_won() {
        assert_eq!(
            extract_amount("입금     100,000\n잔액 1", TransactionType::Deposit).as_deref(),
            Some("100000")
        );
    }

    #[test]
    fn test_deposit_amount_next_line() {
        assert_eq!(
            extract_amount("이체입금\n600,000\n시명길", TransactionType::Deposit).as_deref(),
            Some("600000")
        );
    }

    #[test]
    fn test_deposit_amount_bare_won_fallback() {
        let text = "토스뱅크\n입금 안내\n25,000원\n박영희님";
        assert_eq!(
            extract_amount(text, TransactionType::Deposit).as_deref(),
            Some("25000")
        );
    }

    #[test]
    fn test_withdrawal_amount_line_after_keyword() {
        let text = "945802**314\n박인호\n출금\n2,960,000\n잔액560,000";
        assert_eq!(
            extract_amount(text, TransactionType::Withdrawal).as_deref(),
            Some("2960000")
        );
    }

    #[test]
    fn test_withdrawal_amount_remittance() {
        assert_eq!(
            extract_amount("우리은행\n송금 150,000원", TransactionType::Withdrawal).as_deref(),
            Some("150000")
        );
    }

    #[test]
    fn test_amount_missing() {
        assert_eq!(extract_amount("입금 안내", TransactionType::Deposit), None);
    }

    #[test]
    fn test_comma_only_capture_is_skipped() {
        assert_eq!(extract_amount("입금 ,원", TransactionType::Deposit), None);
    }

    #[test]
    fn test_balance_shapes() {
        assert_eq!(extract_balance("잔액3,710,000원").as_deref(), Some("3710000"));
        assert_eq!(extract_balance("잔액: 1,250,000원").as_deref(), Some("1250000"));
        assert_eq!(extract_balance("잔액 500,000").as_deref(), Some("500000"));
        assert_eq!(extract_balance("(잔액419,500)").as_deref(), Some("419500"));
        assert_eq!(extract_balance("출금\n11,040,045 잔액").as_deref(), Some("11040045"));
        assert_eq!(extract_balance("입금 1원"), None);
    }
}
