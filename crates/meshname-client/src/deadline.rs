//! Per-call deadlines.
//!
//! A `Deadline` is fixed once per top-level bind or resolve and handed
//! to every sub-call, so later calls only get what is left of the
//! budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

/// Stand-in expiry for timeouts too large to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

impl Deadline {
    /// Expire `timeout` from now. Timeouts past what an `Instant` can
    /// hold are capped roughly thirty years out.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self(now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE))
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// Run `fut` until it completes or the deadline passes.
    pub async fn within<F: Future>(&self, fut: F) -> Result<F::Output, TransportError> {
        tokio::time::timeout_at(self.0, fut)
            .await
            .map_err(|_| TransportError::DeadlineExceeded)
    }
}
