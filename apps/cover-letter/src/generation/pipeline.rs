//! Cover letter pipeline: the only place the four stages meet.
//!
//! Flow: build_prompt → CompletionClient::complete → load_template + render →
//!       ArtifactCompiler::compile.
//!
//! Strictly sequential and fail-fast. Nothing is kept between runs.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::prompt_builder::build_prompt;
use crate::llm_client::{CompletionClient, ServiceError};
use crate::models::facts::UserFacts;
use crate::render::{load_template, missing_placeholders, render, ArtifactCompiler};

pub struct Pipeline {
    client: CompletionClient,
    template_path: PathBuf,
    compiler: ArtifactCompiler,
}

impl Pipeline {
    pub fn new(client: CompletionClient, template_path: PathBuf, compiler: ArtifactCompiler) -> Self {
        Self {
            client,
            template_path,
            compiler,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Ok(Self::new(
            CompletionClient::from_config(config)?,
            config.template_path.clone(),
            ArtifactCompiler::from_config(config),
        ))
    }

    /// Runs every stage once and returns the compiled artifact path.
    pub async fn run(&self, facts: &UserFacts) -> Result<PathBuf, AppError> {
        // Step 1: Prompt
        info!(
            "Generating cover letter for {} position at {}",
            facts.job_title, facts.company_name
        );
        let prompt = build_prompt(facts);

        // Step 2: Completion (retries rate limiting internally)
        let body = self.client.complete(&prompt).await?;

        // Step 3: Render
        let template = load_template(&self.template_path).await?;
        let missing = missing_placeholders(&template);
        if !missing.is_empty() {
            warn!(
                "Template {} is missing placeholders {:?}; they will not be substituted",
                self.template_path.display(),
                missing.iter().map(|p| p.token()).collect::<Vec<_>>()
            );
        }
        let document = render(&template, facts, &body);

        // Step 4: Compile
        let artifact = self.compiler.compile(&document).await?;
        info!("Cover letter written to {}", artifact.display());

        Ok(artifact)
    }
}
