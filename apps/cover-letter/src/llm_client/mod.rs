//! LLM Client: the single point of entry for text-generation calls.
//!
//! No other module talks to the generation service directly. The HTTP details live in
//! `backend`, the retry policy in `retry`; `CompletionClient` ties them together.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

pub mod backend;
pub mod prompts;
pub mod retry;

use crate::config::Config;
use crate::llm_client::backend::{CompletionBackend, OpenAiBackend};
use crate::llm_client::prompts::COVER_LETTER_SYSTEM;
use crate::llm_client::retry::{RetryPolicy, RetryState, Sleeper, TokioSleeper};

/// Failure of a single attempt against the generation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Generation service returned no choices")]
    NoChoices,
}

impl ServiceError {
    /// Rate limiting is the only failure the client retries.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ServiceError::RateLimited { .. })
    }
}

/// Final failure of `CompletionClient::complete`, after retries.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Rate limited on all {attempts} attempts (last backoff {last_delay:?})")]
    RetriesExhausted {
        attempts: u32,
        last_delay: Duration,
        #[source]
        last_error: ServiceError,
    },

    #[error("Generation failed on attempt {attempts}: {source}")]
    Service {
        #[source]
        source: ServiceError,
        attempts: u32,
        last_delay: Duration,
    },
}

/// Generation client with rate-limit retry and exponential backoff.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            sleeper: Arc::new(TokioSleeper),
            policy,
        }
    }

    /// Builds the production client: OpenAI-compatible backend plus the configured retry policy.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let backend = OpenAiBackend::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
        )?;
        Ok(Self::new(Arc::new(backend), config.retry_policy))
    }

    /// Replaces the wall-clock sleeper used between attempts.
    #[cfg(test)]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Asks the service for a cover letter body. Returns the trimmed text.
    ///
    /// Rate-limited attempts are retried up to `max_attempts` in total, sleeping
    /// `initial_delay`, then twice that, and so on. Other failures are returned at once.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let mut state = RetryState::start(&self.policy);

        loop {
            state = match state {
                current @ RetryState::Attempting { attempt, .. } => {
                    debug!(
                        "Completion attempt {}/{}",
                        attempt, self.policy.max_attempts
                    );
                    let outcome = self
                        .backend
                        .complete_once(COVER_LETTER_SYSTEM, prompt)
                        .await;
                    current.after_attempt(&self.policy, outcome)
                }
                current @ RetryState::Backoff {
                    delay,
                    attempts_left,
                    attempt,
                } => {
                    warn!(
                        "Rate limit exceeded on attempt {}. Retrying in {}ms ({} attempts left)...",
                        attempt,
                        delay.as_millis(),
                        attempts_left
                    );
                    self.sleeper.sleep(delay).await;
                    current.after_backoff()
                }
                RetryState::Succeeded(text) => {
                    if text.is_empty() {
                        warn!("Generation service returned an empty cover letter body");
                    }
                    info!("Completion succeeded ({} chars)", text.len());
                    return Ok(text);
                }
                RetryState::Failed(err) => return Err(err),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::backend::MockCompletionBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }

    fn rate_limited() -> ServiceError {
        ServiceError::RateLimited {
            message: "Rate limit reached for requests".to_string(),
        }
    }

    fn client_with(
        backend: MockCompletionBackend,
        max_attempts: u32,
    ) -> (CompletionClient, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = CompletionClient::new(
            Arc::new(backend),
            RetryPolicy {
                max_attempts,
                initial_delay: Duration::from_secs(1),
            },
        )
        .with_sleeper(sleeper.clone());
        (client, sleeper)
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_text_on_first_success() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete_once()
            .withf(|system, prompt| {
                system.contains("writes cover letters") && prompt.contains("write it")
            })
            .times(1)
            .returning(|_, _| Ok("  This is a test response\n".to_string()));

        let (client, sleeper) = client_with(backend, 5);
        let text = client.complete("write it").await.unwrap();

        assert_eq!(text, "This is a test response");
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_complete_retries_rate_limit_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete_once().times(3).returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(rate_limited())
            } else {
                Ok("Dear Hiring Manager".to_string())
            }
        });

        let (client, sleeper) = client_with(backend, 5);
        let text = client.complete("prompt").await.unwrap();

        assert_eq!(text, "Dear Hiring Manager");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let delays = sleeper.delays();
        assert_eq!(delays.len(), 2, "must sleep exactly twice");
        assert_eq!(delays[1], delays[0] * 2, "second delay doubles the first");
        assert_eq!(delays[0], Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_complete_gives_up_after_max_attempts() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete_once()
            .times(5)
            .returning(|_, _| Err(rate_limited()));

        let (client, sleeper) = client_with(backend, 5);
        let err = client.complete("prompt").await.unwrap_err();

        match err {
            CompletionError::RetriesExhausted {
                attempts,
                last_delay,
                ..
            } => {
                assert_eq!(attempts, 5);
                assert_eq!(last_delay, Duration::from_secs(8));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    #[tokio::test]
    async fn test_complete_fails_fast_on_non_rate_limit_error() {
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete_once().times(1).returning(|_, _| {
            Err(ServiceError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            })
        });

        let (client, sleeper) = client_with(backend, 5);
        let err = client.complete("prompt").await.unwrap_err();

        assert!(matches!(
            err,
            CompletionError::Service {
                source: ServiceError::Api { status: 401, .. },
                attempts: 1,
                ..
            }
        ));
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_complete_fails_fast_on_server_error_after_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete_once().times(2).returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(rate_limited())
            } else {
                Err(ServiceError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            }
        });

        let (client, sleeper) = client_with(backend, 5);
        let err = client.complete("prompt").await.unwrap_err();

        match err {
            CompletionError::Service {
                attempts,
                last_delay,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(last_delay, Duration::from_secs(1));
            }
            other => panic!("expected Service, got {other:?}"),
        }
        assert_eq!(sleeper.delays().len(), 1);
    }

    /// Empty bodies pass through as success; nothing downstream rejects them yet.
    #[tokio::test]
    async fn test_complete_accepts_whitespace_only_body() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete_once()
            .times(1)
            .returning(|_, _| Ok("   \n\t".to_string()));

        let (client, _) = client_with(backend, 5);
        let text = client.complete("prompt").await.unwrap();
        assert!(text.is_empty(), "empty generated body is not rejected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_with_default_sleeper_backs_off_in_virtual_time() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete_once().times(3).returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(rate_limited())
            } else {
                Ok("ok".to_string())
            }
        });

        let client = CompletionClient::new(Arc::new(backend), RetryPolicy::default());
        let start = tokio::time::Instant::now();
        client.complete("prompt").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
