//! Retry logic with exponential backoff for transient fetch failures.
//!
//! A whole fetch is re-attempted only when its [`FetchOutcome`] is classified
//! as [`FailureType::Transient`] or [`FailureType::RateLimited`]. Everything
//! else (opened, policy rejections, local issues) is final.
//!
//! # Example
//!
//! ```
//! use fetcher_core::fetch::{FetchOutcome, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::with_max_attempts(3);
//! match policy.should_retry(FetchOutcome::NetworkFailure(Some(503)), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::FetchOutcome;

/// Default maximum attempts (a single attempt, no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of fetch outcomes for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: no response at all, 408, 5xx server errors.
    Transient,

    /// Server rate limiting (HTTP 429).
    RateLimited,

    /// Final outcome; retrying would not change it.
    Final,
}

/// Decision on whether to retry a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the fetch after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the fetch.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt (typically 2.0 for doubling).
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings. `max_attempts` is
    /// clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom max_attempts, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `outcome` on attempt `attempt` (1-indexed).
    #[must_use]
    pub fn should_retry(&self, outcome: FetchOutcome, attempt: u32) -> RetryDecision {
        if classify_outcome(outcome) == FailureType::Final {
            return RetryDecision::DoNotRetry {
                reason: format!("{} is final", outcome.label()),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + Self::calculate_jitter()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter() -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies a fetch outcome for retry decisions.
///
/// | Outcome | Type |
/// |---------|------|
/// | `NetworkFailure(None)` | Transient |
/// | `NetworkFailure(408)` | Transient |
/// | `NetworkFailure(429)` | RateLimited |
/// | `NetworkFailure(5xx)` | Transient |
/// | everything else | Final |
#[must_use]
pub fn classify_outcome(outcome: FetchOutcome) -> FailureType {
    match outcome {
        FetchOutcome::NetworkFailure(None | Some(408)) => FailureType::Transient,
        FetchOutcome::NetworkFailure(Some(429)) => FailureType::RateLimited,
        FetchOutcome::NetworkFailure(Some(status)) if (500..600).contains(&status) => {
            FailureType::Transient
        }
        _ => FailureType::Final,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 1);
        assert!(matches!(
            policy.should_retry(FetchOutcome::NetworkFailure(None), 1),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_classify_outcome_table() {
        assert_eq!(classify_outcome(FetchOutcome::NetworkFailure(None)), FailureType::Transient);
        assert_eq!(
            classify_outcome(FetchOutcome::NetworkFailure(Some(503))),
            FailureType::Transient
        );
        assert_eq!(
            classify_outcome(FetchOutcome::NetworkFailure(Some(408))),
            FailureType::Transient
        );
        assert_eq!(
            classify_outcome(FetchOutcome::NetworkFailure(Some(429))),
            FailureType::RateLimited
        );
        assert_eq!(
            classify_outcome(FetchOutcome::NetworkFailure(Some(404))),
            FailureType::Final
        );
        assert_eq!(classify_outcome(FetchOutcome::WriteFailed), FailureType::Final);
        assert_eq!(classify_outcome(FetchOutcome::Success), FailureType::Final);
    }

    #[test]
    fn test_should_retry_transient_until_exhausted() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_secs(1), 2.0);
        let outcome = FetchOutcome::NetworkFailure(Some(502));

        match policy.should_retry(outcome, 1) {
            RetryDecision::Retry { attempt, delay } => {
                assert_eq!(attempt, 2);
                assert!(delay >= Duration::from_millis(10));
            }
            other => panic!("expected retry, got {other:?}"),
        }
        assert!(matches!(policy.should_retry(outcome, 2), RetryDecision::Retry { attempt: 3, .. }));
        assert!(matches!(policy.should_retry(outcome, 3), RetryDecision::DoNotRetry { .. }));
    }

    #[test]
    fn test_should_not_retry_final_outcomes() {
        let policy = RetryPolicy::with_max_attempts(5);
        for outcome in [
            FetchOutcome::OpenedExternally,
            FetchOutcome::InvalidInput,
            FetchOutcome::UnsupportedPayloadType,
            FetchOutcome::NetworkFailure(Some(404)),
        ] {
            assert!(
                matches!(policy.should_retry(outcome, 1), RetryDecision::DoNotRetry { .. }),
                "{outcome:?} must not be retried"
            );
        }
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(2), 2.0);
        let delay = policy.calculate_delay(8);
        assert!(delay >= Duration::from_secs(2));
        assert!(delay <= Duration::from_millis(2500));
    }
}
