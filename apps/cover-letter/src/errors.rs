use thiserror::Error;

use crate::llm_client::CompletionError;
use crate::render::{CompileError, RenderError};

/// Pipeline-level error. Any stage failure ends the run as one of these.
///
/// `Display` carries the full classification for the run log; the console only ever
/// shows `user_message`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Template error: {0}")]
    Render(#[from] RenderError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
}

impl AppError {
    /// Stable classification code recorded in the run log.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Completion(CompletionError::RetriesExhausted { .. }) => "RATE_LIMITED",
            AppError::Completion(CompletionError::Service { .. }) => "SERVICE_ERROR",
            AppError::Render(RenderError::TemplateRead { .. }) => "TEMPLATE_READ_ERROR",
            AppError::Compile(_) => "COMPILE_ERROR",
        }
    }

    /// Human-readable message for the console.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Completion(CompletionError::RetriesExhausted { .. }) => {
                "The text generation service is rate limiting requests. Please try again later."
                    .to_string()
            }
            AppError::Completion(CompletionError::Service { .. }) => {
                "The text generation service could not write the cover letter. \
                 Check your API key and network connection, then try again."
                    .to_string()
            }
            AppError::Render(RenderError::TemplateRead { path, .. }) => {
                format!("Could not read the cover letter template at '{}'.", path.display())
            }
            AppError::Compile(_) => {
                "Failed to generate PDF. Please check LaTeX installation and try again."
                    .to_string()
            }
        }
    }
}
