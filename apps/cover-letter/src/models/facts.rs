use chrono::NaiveDate;

/// Everything the user tells us about themselves and the role, captured once per run.
///
/// Never mutated after construction. The two handle fields are derived from their URLs
/// by `UserFacts::new` and show up verbatim in the rendered letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacts {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub linkedin: String,
    pub linkedin_username: String,
    pub github: String,
    pub github_username: String,
    pub job_title: String,
    pub company_name: String,
    pub company_address: String,
    pub resume_summary: String,
    pub request_date: NaiveDate,
}

/// Raw user input before handle derivation.
#[derive(Debug, Clone)]
pub struct FactsInput {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub linkedin: String,
    pub github: String,
    pub job_title: String,
    pub company_name: String,
    pub company_address: String,
    pub resume_summary: String,
}

impl UserFacts {
    pub fn new(input: FactsInput, request_date: NaiveDate) -> Self {
        let linkedin_username = url_handle(&input.linkedin).to_string();
        let github_username = url_handle(&input.github).to_string();

        Self {
            full_name: input.full_name,
            phone: input.phone,
            email: input.email,
            website: input.website,
            linkedin: input.linkedin,
            linkedin_username,
            github: input.github,
            github_username,
            job_title: input.job_title,
            company_name: input.company_name,
            company_address: input.company_address,
            resume_summary: input.resume_summary,
            request_date,
        }
    }
}

/// Returns the final `/`-separated segment of a profile URL.
///
/// No `/` at all yields the whole input; a trailing `/` yields `""`.
pub fn url_handle(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
