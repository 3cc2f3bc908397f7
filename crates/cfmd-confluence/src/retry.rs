//! Retry policy for transient Confluence failures.

use std::time::Duration;

use crate::error::ConfluenceError;

/// Backoff delays between attempts; the request is tried once more than
/// there are delays.
const BACKOFF_SECS: [u64; 3] = [1, 2, 4];

/// Upper bound on a server-requested `Retry-After`.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Exponential backoff for rate limiting, unavailability and dropped
/// connections.
#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delays: BACKOFF_SECS.iter().copied().map(Duration::from_secs).collect(),
        }
    }
}

impl RetryPolicy {
    /// Policy with custom delays.
    #[cfg(test)]
    pub(crate) fn with_delays(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// Total attempts including the first.
    pub(crate) fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Delay before retrying after `retries` previous retries, or `None`
    /// when the error is permanent or retries are exhausted.
    pub(crate) fn delay_for(&self, retries: usize, err: &ConfluenceError) -> Option<Duration> {
        let backoff = *self.delays.get(retries)?;
        match err {
            ConfluenceError::HttpResponse {
                status: 429 | 503,
                retry_after,
                ..
            } => Some(
                retry_after
                    .map(Duration::from_secs)
                    .map_or(backoff, |d| d.min(MAX_RETRY_AFTER)),
            ),
            ConfluenceError::HttpRequest(e) if is_transient(e) => Some(backoff),
            ConfluenceError::HttpResponse { .. } | ConfluenceError::HttpRequest(_) => None,
        }
    }
}

fn is_transient(err: &ureq::Error) -> bool {
    matches!(
        err,
        ureq::Error::Timeout(_) | ureq::Error::Io(_) | ureq::Error::ConnectionFailed
    )
}
