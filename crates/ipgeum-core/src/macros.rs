//! Regex helpers shared by the parser and intake modules

/// Lazily compiled regex accessor
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            RE.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

/// Lazily compiled ordered regex table, tried first to last
macro_rules! re_list {
    ($name:ident, [$($pat:expr),+ $(,)?]) => {
        fn $name() -> &'static [regex::Regex] {
            static RE: std::sync::OnceLock<Vec<regex::Regex>> = std::sync::OnceLock::new();
            RE.get_or_init(|| vec![$(regex::Regex::new($pat).expect("invalid regex")),+])
        }
    };
}
