/// System instruction sent with every cover letter request.
pub const COVER_LETTER_SYSTEM: &str = "You are a helpful assistant that writes cover letters.";
