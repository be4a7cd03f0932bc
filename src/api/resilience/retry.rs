//! Retry policy with a fixed backoff
//!
//! Decides how each HTTP attempt is classified and how long to wait before the
//! next one.

use crate::api::models::Method;
use std::fmt;
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts per logical call, initial try included
    pub max_attempts: u32,
    /// Sleep between two attempts of the same call
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// How a single attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// 200: parse the body
    Success,
    /// 204 on a DELETE: no body expected
    NoContent,
    /// Anything else; retried while attempts remain
    Transient(FailureKind),
}

/// Why an attempt counted as a failure
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    Status(u16),
    Transport(String),
}

impl FailureKind {
    /// Connection, timeout and body-read failures are retried like bad statuses
    pub fn from_transport_error(error: &reqwest::Error) -> Self {
        FailureKind::Transport(error.to_string())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FailureKind::Status(code) => Some(*code),
            FailureKind::Transport(_) => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Status(code) => write!(f, "{}", code),
            FailureKind::Transport(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

impl AttemptOutcome {
    /// Classify an HTTP status for the given method
    pub fn from_status(method: Method, status: u16) -> Self {
        match (method, status) {
            (_, 200) => AttemptOutcome::Success,
            (Method::Delete, 204) => AttemptOutcome::NoContent,
            _ => AttemptOutcome::Transient(FailureKind::Status(status)),
        }
    }
}

/// Retry policy applied by the executor to every logical call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Delay to sleep after a failed `attempt` (1-based) out of `max_attempts`.
    ///
    /// `None` after the final attempt: exhaustion is reported without sleeping.
    pub fn delay_after(&self, attempt: u32, max_attempts: u32) -> Option<Duration> {
        if attempt >= max_attempts {
            None
        } else {
            Some(self.config.backoff)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(AttemptOutcome::from_status(Method::Get, 200), AttemptOutcome::Success);
        assert_eq!(AttemptOutcome::from_status(Method::Delete, 200), AttemptOutcome::Success);
        assert_eq!(AttemptOutcome::from_status(Method::Delete, 204), AttemptOutcome::NoContent);

        // 204 is only accepted for deletes
        assert_eq!(
            AttemptOutcome::from_status(Method::Post, 204),
            AttemptOutcome::Transient(FailureKind::Status(204))
        );
        assert_eq!(
            AttemptOutcome::from_status(Method::Get, 404),
            AttemptOutcome::Transient(FailureKind::Status(404))
        );
        assert_eq!(
            AttemptOutcome::from_status(Method::Post, 503),
            AttemptOutcome::Transient(FailureKind::Status(503))
        );
    }

    #[test]
    fn test_fixed_backoff_skips_final_attempt() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        });

        assert_eq!(policy.delay_after(1, 3), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(2, 3), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(3, 3), None);
    }

    #[test]
    fn test_max_attempts_never_zero() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 0,
            backoff: Duration::ZERO,
        });
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Status(500).to_string(), "500");
        assert_eq!(FailureKind::Status(502).status_code(), Some(502));
        assert_eq!(FailureKind::Transport("refused".into()).status_code(), None);
    }
}
