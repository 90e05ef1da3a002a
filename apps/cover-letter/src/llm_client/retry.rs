//! Retry state machine for completion calls.
//!
//! Only rate limiting is retried. Every other failure ends the run on the attempt it
//! happened. Time is never read here: the caller performs each `Backoff` wait through
//! a `Sleeper`, so tests drive the machine without real delays.

use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{CompletionError, ServiceError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Attempt budget and starting delay. The delay doubles after every rate-limited attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

#[derive(Debug)]
pub enum RetryState {
    /// About to make 1-based attempt `attempt`. `delay` is the wait to use if it is rate
    /// limited; `last_delay` is the wait that preceded it (zero before the first attempt).
    Attempting {
        attempt: u32,
        delay: Duration,
        last_delay: Duration,
    },
    /// Attempt `attempt` was rate limited; wait `delay` before the next one.
    Backoff {
        delay: Duration,
        attempts_left: u32,
        attempt: u32,
    },
    Succeeded(String),
    Failed(CompletionError),
}

impl RetryState {
    pub fn start(policy: &RetryPolicy) -> Self {
        RetryState::Attempting {
            attempt: 1,
            delay: policy.initial_delay,
            last_delay: Duration::ZERO,
        }
    }

    /// Applies the outcome of the attempt made in the `Attempting` state.
    /// Any other state is returned unchanged.
    pub fn after_attempt(
        self,
        policy: &RetryPolicy,
        outcome: Result<String, ServiceError>,
    ) -> Self {
        let (attempt, delay, last_delay) = match self {
            RetryState::Attempting {
                attempt,
                delay,
                last_delay,
            } => (attempt, delay, last_delay),
            other => return other,
        };

        match outcome {
            Ok(text) => RetryState::Succeeded(text.trim().to_string()),
            Err(err) if err.is_rate_limited() && attempt < policy.max_attempts => {
                RetryState::Backoff {
                    delay,
                    attempts_left: policy.max_attempts - attempt,
                    attempt,
                }
            }
            Err(err) if err.is_rate_limited() => {
                RetryState::Failed(CompletionError::RetriesExhausted {
                    attempts: attempt,
                    last_delay,
                    last_error: err,
                })
            }
            Err(err) => RetryState::Failed(CompletionError::Service {
                source: err,
                attempts: attempt,
                last_delay,
            }),
        }
    }

    /// Moves from `Backoff` to the next attempt once the wait has elapsed, doubling the delay.
    /// Any other state is returned unchanged.
    pub fn after_backoff(self) -> Self {
        match self {
            RetryState::Backoff { delay, attempt, .. } => RetryState::Attempting {
                attempt: attempt + 1,
                delay: delay.saturating_mul(2),
                last_delay: delay,
            },
            other => other,
        }
    }
}

/// Suspends the pipeline between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Real wall-clock sleeper.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
