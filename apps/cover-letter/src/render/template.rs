//! Template Renderer: literal substitution of the twelve `{{TOKEN}}` placeholders.
//!
//! Matching is exact and case-sensitive. Tokens are replaced one after another in
//! `Placeholder::ALL` order, so a token carried inside a user fact is itself replaced by a
//! later pass. The generated body goes in last and is never scanned.
//! A placeholder missing from the template is not an error; `missing_placeholders`
//! reports it so the caller can warn.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::facts::UserFacts;

/// Long-form letter date, e.g. "March 05, 2024".
const LETTER_DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template '{}': {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every placeholder the renderer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    FullName,
    Phone,
    Email,
    Website,
    Linkedin,
    LinkedinUsername,
    Github,
    GithubUsername,
    Date,
    CompanyName,
    CompanyAddress,
    CoverLetterContent,
}

impl Placeholder {
    /// Substitution order. The generated body must stay last.
    pub const ALL: [Placeholder; 12] = [
        Placeholder::FullName,
        Placeholder::Phone,
        Placeholder::Email,
        Placeholder::Website,
        Placeholder::Linkedin,
        Placeholder::LinkedinUsername,
        Placeholder::Github,
        Placeholder::GithubUsername,
        Placeholder::Date,
        Placeholder::CompanyName,
        Placeholder::CompanyAddress,
        Placeholder::CoverLetterContent,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Placeholder::FullName => "{{FULL_NAME}}",
            Placeholder::Phone => "{{PHONE}}",
            Placeholder::Email => "{{EMAIL}}",
            Placeholder::Website => "{{WEBSITE}}",
            Placeholder::Linkedin => "{{LINKEDIN}}",
            Placeholder::LinkedinUsername => "{{LINKEDIN_USERNAME}}",
            Placeholder::Github => "{{GITHUB}}",
            Placeholder::GithubUsername => "{{GITHUB_USERNAME}}",
            Placeholder::Date => "{{DATE}}",
            Placeholder::CompanyName => "{{COMPANY_NAME}}",
            Placeholder::CompanyAddress => "{{COMPANY_ADDRESS}}",
            Placeholder::CoverLetterContent => "{{COVER_LETTER_CONTENT}}",
        }
    }

    fn value<'a>(self, facts: &'a UserFacts, body: &'a str, date: &'a str) -> &'a str {
        match self {
            Placeholder::FullName => &facts.full_name,
            Placeholder::Phone => &facts.phone,
            Placeholder::Email => &facts.email,
            Placeholder::Website => &facts.website,
            Placeholder::Linkedin => &facts.linkedin,
            Placeholder::LinkedinUsername => &facts.linkedin_username,
            Placeholder::Github => &facts.github,
            Placeholder::GithubUsername => &facts.github_username,
            Placeholder::Date => date,
            Placeholder::CompanyName => &facts.company_name,
            Placeholder::CompanyAddress => &facts.company_address,
            Placeholder::CoverLetterContent => body,
        }
    }
}

/// Reads the template file. Fails with `RenderError::TemplateRead` if it cannot be read.
pub async fn load_template(path: &Path) -> Result<String, RenderError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })
}

pub fn format_letter_date(date: NaiveDate) -> String {
    date.format(LETTER_DATE_FORMAT).to_string()
}

/// Placeholders that do not occur in `template` and will therefore not be substituted.
pub fn missing_placeholders(template: &str) -> Vec<Placeholder> {
    Placeholder::ALL
        .into_iter()
        .filter(|p| !template.contains(p.token()))
        .collect()
}

/// Globally replaces each placeholder in turn, `{{COVER_LETTER_CONTENT}}` last.
pub fn render(template: &str, facts: &UserFacts, body: &str) -> String {
    let date = format_letter_date(facts.request_date);

    Placeholder::ALL
        .into_iter()
        .fold(template.to_string(), |document, placeholder| {
            document.replace(placeholder.token(), placeholder.value(facts, body, &date))
        })
}
