//! Retry policy for chat-completion calls.
//!
//! A call moves through a small state machine:
//!
//! ```text
//! Attempting(1) ──ok──────────────────────────────▶ Succeeded
//!      │
//!      └─err─▶ decide(err, attempt) ──FailNow────▶ Failed
//!                     │
//!                     └─RetryAfter(d)─▶ WaitingToRetry ──sleep(d)──▶ Attempting(n+1)
//! ```
//!
//! [`RetryPolicy::decide`] is pure, so the whole schedule can be checked
//! without a server or a clock.

use std::time::Duration;

use anygpt_types::{ClientConfig, ClientError};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    FailNow,
}

/// State of one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt number `attempt` (1-based) is about to be sent.
    Attempting { attempt: u32 },
    /// Sleeping before `next_attempt`.
    WaitingToRetry { next_attempt: u32, delay: Duration },
    Succeeded,
    Failed,
}

/// Bounded exponential backoff: `base * 2^(k-1)` before retry `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_retries, config.base_retry_delay())
    }

    /// Total attempts including the first one.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Map a failed attempt onto the next step.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn decide(&self, error: &ClientError, attempt: u32) -> RetryDecision {
        if !error.is_retryable() || attempt > self.max_retries {
            return RetryDecision::FailNow;
        }
        RetryDecision::RetryAfter(self.backoff_delay(attempt))
    }

    /// Transition out of `Attempting { attempt }` given its outcome.
    pub fn after_attempt(&self, attempt: u32, error: Option<&ClientError>) -> RetryState {
        let Some(error) = error else {
            return RetryState::Succeeded;
        };
        match self.decide(error, attempt) {
            RetryDecision::RetryAfter(delay) => {
                RetryState::WaitingToRetry { next_attempt: attempt + 1, delay }
            }
            RetryDecision::FailNow => RetryState::Failed,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}
