//! Prompt Builder: turns `UserFacts` into the single user message sent to the model.
//!
//! Job title, company name, and resume summary are embedded verbatim: no truncation,
//! no escaping, and no second substitution pass over user text.

use crate::generation::prompts::{
    REQUEST_PREFIX, RESUME_INTRO, TAILORING_INSTRUCTION, TONE_INSTRUCTION,
};
use crate::models::facts::UserFacts;

/// Builds the cover letter instruction for the given facts. Pure and deterministic.
pub fn build_prompt(facts: &UserFacts) -> String {
    format!(
        "{REQUEST_PREFIX}{job_title} position at {company}.\n\
         {RESUME_INTRO}\n\
         {summary}\n\
         \n\
         {TAILORING_INSTRUCTION}\n\
         {TONE_INSTRUCTION}{company}.\n",
        job_title = facts.job_title,
        company = facts.company_name,
        summary = facts.resume_summary,
    )
}
