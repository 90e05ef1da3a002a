//! CLI argument parsing for cover-letter.
//!
//! Every option is required; clap reports a usage error and exits nonzero before
//! any configuration is loaded or any request is made.

use chrono::NaiveDate;
use clap::Parser;

use crate::models::facts::{FactsInput, UserFacts};

/// Generate a cover letter PDF tailored to a job and company.
#[derive(Parser, Debug)]
#[command(name = "cover-letter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Your full name
    #[arg(long)]
    pub name: String,

    /// Your phone number
    #[arg(long)]
    pub phone: String,

    /// Your email address
    #[arg(long)]
    pub email: String,

    /// Your website URL
    #[arg(long)]
    pub website: String,

    /// Your LinkedIn URL
    #[arg(long)]
    pub linkedin: String,

    /// Your GitHub URL
    #[arg(long)]
    pub github: String,

    /// Job title you're applying for
    #[arg(long)]
    pub job_title: String,

    /// Company name
    #[arg(long)]
    pub company: String,

    /// Company address
    #[arg(long)]
    pub company_address: String,

    /// Summary of your resume
    #[arg(long)]
    pub resume_summary: String,
}

impl Cli {
    /// Converts parsed arguments into the run's facts, dated `request_date`.
    pub fn into_facts(self, request_date: NaiveDate) -> UserFacts {
        UserFacts::new(
            FactsInput {
                full_name: self.name,
                phone: self.phone,
                email: self.email,
                website: self.website,
                linkedin: self.linkedin,
                github: self.github,
                job_title: self.job_title,
                company_name: self.company,
                company_address: self.company_address,
                resume_summary: self.resume_summary,
            },
            request_date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    const FULL_ARGS: &[&str] = &[
        "cover-letter",
        "--name",
        "John Doe",
        "--phone",
        "123-456-7890",
        "--email",
        "john@example.com",
        "--website",
        "johndoe.com",
        "--linkedin",
        "linkedin.com/in/johndoe",
        "--github",
        "github.com/jdoe",
        "--job-title",
        "Software Engineer",
        "--company",
        "Tech Corp",
        "--company-address",
        "123 Tech St, San Francisco, CA",
        "--resume-summary",
        "Experienced developer",
    ];

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_all_required_options_into_facts() {
        let cli = Cli::try_parse_from(FULL_ARGS).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let facts = cli.into_facts(date);

        assert_eq!(facts.full_name, "John Doe");
        assert_eq!(facts.job_title, "Software Engineer");
        assert_eq!(facts.company_name, "Tech Corp");
        assert_eq!(facts.company_address, "123 Tech St, San Francisco, CA");
        assert_eq!(facts.linkedin_username, "johndoe");
        assert_eq!(facts.github_username, "jdoe");
        assert_eq!(facts.request_date, date);
    }

    #[test]
    fn test_missing_option_is_usage_error() {
        let mut without_company = FULL_ARGS.to_vec();
        let pos = without_company
            .iter()
            .position(|a| *a == "--company")
            .unwrap();
        without_company.drain(pos..pos + 2);

        let err = Cli::try_parse_from(without_company).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
