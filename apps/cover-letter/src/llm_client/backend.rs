//! Single-attempt transport to an OpenAI-compatible chat completions endpoint.
//!
//! One call here is one HTTP request. Retrying is the caller's business; this module
//! only classifies what went wrong.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::ServiceError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const CHOICES: u32 = 1;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// One request/response exchange with the generation service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends `system` and `prompt` as a two-message chat and returns the raw generated text.
    async fn complete_once(&self, system: &str, prompt: &str) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    n: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice. A choice with null content counts as empty text.
    pub fn into_text(self) -> Result<String, ServiceError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(ServiceError::NoChoices)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI chat completions over `reqwest`.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, api_url: String, model: String) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_url,
            model,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete_once(&self, system: &str, prompt: &str) -> Result<String, ServiceError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            n: CHOICES,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        debug!("Chat completion returned {} choice(s)", parsed.choices.len());
        parsed.into_text()
    }
}

/// Maps a non-success HTTP response to a `ServiceError`. 429 is rate limiting; the rest
/// (auth, bad request, 5xx) are reported as plain API errors.
pub fn classify_failure(status: StatusCode, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        ServiceError::RateLimited { message }
    } else {
        ServiceError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
