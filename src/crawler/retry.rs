//! Retry state machine for page fetches
//!
//! A fetch moves through these phases:
//!
//! | Phase | Entered when |
//! |-------|--------------|
//! | `Attempting` | a request is about to be sent |
//! | `BackoffWait` | a 5xx or transient error left budget; delay doubles afterwards |
//! | `RateLimitWait` | a 429 left budget; waits `Retry-After` (or the current delay) |
//! | `Succeeded` | a 2xx body was read |
//! | `Exhausted` | a retryable failure arrived with no budget left |
//! | `Aborted` | a non-retryable status or unexpected error arrived |
//!
//! The machine is pure: it decides how long to wait but never sleeps, so the
//! fetcher owns every suspension point and tests can drive it with a simulated clock.

use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Server error statuses that are retried with backoff
pub const RETRYABLE_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];

/// Retry budget and initial backoff delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first failed attempt
    pub max_retries: u32,

    /// Backoff delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Returns the longest total backoff a fetch can spend, jitter included
    ///
    /// `Retry-After` waits are not bounded and not included.
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn worst_case_backoff(&self) -> Duration {
        let base = self.initial_delay.as_secs_f64();
        (0..self.max_retries)
            .map(|i| {
                Duration::try_from_secs_f64(base * 2f64.powi(i as i32) * 1.1)
                    .unwrap_or(Duration::MAX)
            })
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Why an attempt did not produce content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// HTTP 429, with the parsed `Retry-After` if present
    RateLimited { retry_after: Option<Duration> },

    /// HTTP 500, 502, 503 or 504
    RetryableStatus(u16),

    /// Connection failure, reset, timeout or interrupted body
    Transient(String),

    /// Any other non-success status
    NonRetryable(u16),

    /// A failure that retrying cannot fix (e.g. the request could not be built)
    Unexpected(String),
}

impl AttemptError {
    /// Classifies a non-success status code
    pub fn from_status(status: u16, retry_after: Option<Duration>) -> Self {
        if status == 429 {
            Self::RateLimited { retry_after }
        } else if RETRYABLE_STATUS_CODES.contains(&status) {
            Self::RetryableStatus(status)
        } else {
            Self::NonRetryable(status)
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited { .. } => write!(f, "HTTP 429 rate limited"),
            Self::RetryableStatus(status) | Self::NonRetryable(status) => {
                write!(f, "HTTP {}", status)
            }
            Self::Transient(error) => write!(f, "transient error: {}", error),
            Self::Unexpected(error) => write!(f, "unexpected error: {}", error),
        }
    }
}

/// Current phase of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    Attempting,
    BackoffWait(Duration),
    RateLimitWait(Duration),
    Succeeded,
    Exhausted,
    Aborted,
}

impl RetryPhase {
    /// Returns how long to wait before the next attempt, if this is a wait phase
    pub fn wait(&self) -> Option<Duration> {
        match self {
            Self::BackoffWait(wait) | Self::RateLimitWait(wait) => Some(*wait),
            _ => None,
        }
    }

    /// Returns true if no further attempt will be made
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted | Self::Aborted)
    }
}

/// Retry bookkeeping for one fetch
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    failures: u32,
    delay: Duration,
    phase: RetryPhase,
}

impl RetryState {
    /// Creates the state for a fresh fetch
    pub fn new(policy: RetryPolicy) -> Self {
        let delay = policy.initial_delay;
        Self {
            policy,
            failures: 0,
            delay,
            phase: RetryPhase::Attempting,
        }
    }

    /// Returns the current phase
    pub fn phase(&self) -> RetryPhase {
        self.phase
    }

    /// Returns the number of failed attempts so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Returns the backoff delay the next backoff wait will start from
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    /// Records a successful attempt
    pub fn on_success(&mut self) -> RetryPhase {
        self.phase = RetryPhase::Succeeded;
        self.phase
    }

    /// Records a failed attempt and decides what happens next
    ///
    /// Every failure counts against the budget. Only backoff waits double the
    /// delay; a rate-limit wait leaves it untouched.
    pub fn on_failure(&mut self, error: &AttemptError) -> RetryPhase {
        self.failures += 1;

        self.phase = match error {
            AttemptError::NonRetryable(_) | AttemptError::Unexpected(_) => RetryPhase::Aborted,
            _ if self.failures > self.policy.max_retries => RetryPhase::Exhausted,
            AttemptError::RateLimited { retry_after } => {
                RetryPhase::RateLimitWait(retry_after.unwrap_or(self.delay))
            }
            AttemptError::RetryableStatus(_) | AttemptError::Transient(_) => {
                let wait = with_jitter(self.delay);
                self.delay = self.delay.saturating_mul(2);
                RetryPhase::BackoffWait(wait)
            }
        };

        self.phase
    }

    /// Moves back to `Attempting` once a wait has elapsed
    pub fn resume(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = RetryPhase::Attempting;
        }
    }
}

/// Adds uniform jitter in `[0, 0.1 * delay]`
fn with_jitter(delay: Duration) -> Duration {
    let base = delay.as_secs_f64();
    let jitter = rand::thread_rng().gen_range(0.0..=0.1 * base);
    Duration::try_from_secs_f64(base + jitter).unwrap_or(delay)
}

/// Parses a `Retry-After` header given in whole seconds
///
/// HTTP-date values and anything else unparseable yield None, which makes the
/// caller fall back to its current backoff delay.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
