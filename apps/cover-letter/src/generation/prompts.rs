// Prompt fragments for cover letter generation.
// The system instruction itself lives in llm_client::prompts.

/// Opening request. Followed by the job title, " position at ", and the company name.
pub const REQUEST_PREFIX: &str = "Please write a cover letter for a ";

/// Introduces the verbatim resume summary.
pub const RESUME_INTRO: &str = "Use the following information from my resume:";

/// Tailoring instruction appended after the resume summary.
pub const TAILORING_INSTRUCTION: &str = "Please tailor the cover letter to highlight my most \
    relevant skills and experiences for this specific position.";

/// Tone instruction. Followed by the company name and a period.
pub const TONE_INSTRUCTION: &str = "The tone should be professional yet enthusiastic, \
    demonstrating my passion for technology and eagerness to contribute to ";
