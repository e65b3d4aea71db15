//! Matching-member lookup capability
//!
//! The parser asks whether a deposit's sender is a registered account holder
//! of the resolved company. The answer comes from whatever implements
//! [`MatchingLookup`]: the SQLite [`Database`](crate::db::Database) in
//! production, [`MemberDirectory`] in tests and offline tooling.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Answers "is this holder a matching member of this category?"
#[async_trait]
pub trait MatchingLookup: Send + Sync {
    async fn is_matching_member(&self, category: &str, account_holder: &str) -> Result<bool>;
}

/// Holder name rule shared by every lookup: equal, or the stored name
/// contains the queried one. Blank inputs never match.
pub fn holder_matches(stored: &str, queried: &str) -> bool {
    !queried.is_empty() && (stored == queried || stored.contains(queried))
}

/// What to report when the lookup itself fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupFailurePolicy {
    /// Not a member, no alert
    #[default]
    Suppress,
    /// Not a member, raise the new-depositor alert
    Alert,
}

impl LookupFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suppress => "suppress",
            Self::Alert => "alert",
        }
    }

    /// `(is_matching_member, requires_new_alert)` after a failed lookup
    pub fn flags(&self) -> (bool, bool) {
        match self {
            Self::Suppress => (false, false),
            Self::Alert => (false, true),
        }
    }
}

impl std::str::FromStr for LookupFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "suppress" => Ok(Self::Suppress),
            "alert" => Ok(Self::Alert),
            _ => Err(format!("Unknown lookup failure policy: {}", s)),
        }
    }
}

impl std::fmt::Display for LookupFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory member registry keyed by category
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    members: HashMap<String, Vec<String>>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(category, account_holder)` pairs
    pub fn with_members<I, C, H>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, H)>,
        C: Into<String>,
        H: Into<String>,
    {
        let mut directory = Self::new();
        for (category, holder) in pairs {
            directory.add(category, holder);
        }
        directory
    }

    pub fn add(&mut self, category: impl Into<String>, account_holder: impl Into<String>) {
        self.members
            .entry(category.into())
            .or_default()
            .push(account_holder.into());
    }

    pub fn contains(&self, category: &str, account_holder: &str) -> bool {
        if category.is_empty() {
            return false;
        }
        self.members
            .get(category)
            .is_some_and(|holders| holders.iter().any(|h| holder_matches(h, account_holder)))
    }

    pub fn len(&self) -> usize {
        self.members.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MatchingLookup for MemberDirectory {
    async fn is_matching_member(&self, category: &str, account_holder: &str) -> Result<bool> {
        Ok(self.contains(category, account_holder))
    }
}
