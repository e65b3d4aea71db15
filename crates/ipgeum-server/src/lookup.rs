//! Time-bounded matching-member lookup

use std::time::Duration;

use async_trait::async_trait;
use ipgeum_core::{Error, MatchingLookup, Result};

/// Wraps a lookup so a slow backend cannot stall intake.
///
/// An elapsed timeout is reported as a lookup error, so the caller's
/// failure policy applies. The inner lookup must yield to the executor;
/// a lookup that blocks the thread cannot be interrupted.
pub struct TimedLookup<'a> {
    inner: &'a dyn MatchingLookup,
    timeout: Duration,
}

impl<'a> TimedLookup<'a> {
    pub fn new(inner: &'a dyn MatchingLookup, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl MatchingLookup for TimedLookup<'_> {
    async fn is_matching_member(&self, category: &str, account_holder: &str) -> Result<bool> {
        match tokio::time::timeout(
            self.timeout,
            self.inner.is_matching_member(category, account_holder),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Lookup(format!(
                "timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}
