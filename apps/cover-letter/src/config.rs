use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::backend::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::llm_client::retry::{RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS};

/// Run configuration loaded from environment variables (and `.env` if present).
/// Built once in `main` and passed down explicitly; nothing below reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub openai_model: String,
    pub template_path: PathBuf,
    pub work_dir: PathBuf,
    /// Compile each run in its own `<work_dir>/<uuid>` directory.
    pub isolate_work_dir: bool,
    pub latex_compiler: String,
    pub latex_compiler_args: Vec<String>,
    pub retry_policy: RetryPolicy,
}

/// Run log settings. Resolved before `Config` so that configuration errors are logged too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Append-only run log.
    pub log_file: PathBuf,
    pub rust_log: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Never fails: every setting has a default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LogConfig {
            log_file: PathBuf::from(
                lookup("COVER_LETTER_LOG_FILE")
                    .unwrap_or_else(|| "cover_letter_generator.log".to_string()),
            ),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let max_attempts = get("RETRY_MAX_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string())
            .parse::<u32>()
            .context("RETRY_MAX_ATTEMPTS must be a positive integer")?;
        if max_attempts == 0 {
            bail!("RETRY_MAX_ATTEMPTS must be at least 1");
        }

        let initial_delay_ms = get(
            "RETRY_INITIAL_DELAY_MS",
            &DEFAULT_INITIAL_DELAY.as_millis().to_string(),
        )
        .parse::<u64>()
        .context("RETRY_INITIAL_DELAY_MS must be a number of milliseconds")?;

        let isolate_work_dir = parse_bool(&get("COVER_LETTER_ISOLATE_WORK_DIR", "false"))
            .context("COVER_LETTER_ISOLATE_WORK_DIR must be true or false")?;

        Ok(Config {
            openai_api_key: lookup("OPENAI_API_KEY")
                .context("Required environment variable 'OPENAI_API_KEY' is not set")?,
            openai_api_url: get("OPENAI_API_URL", DEFAULT_API_URL),
            openai_model: get("OPENAI_MODEL", DEFAULT_MODEL),
            template_path: PathBuf::from(get("COVER_LETTER_TEMPLATE", "latex_template.tex")),
            work_dir: PathBuf::from(get("COVER_LETTER_WORK_DIR", ".")),
            isolate_work_dir,
            latex_compiler: get("LATEX_COMPILER", "pdflatex"),
            latex_compiler_args: get("LATEX_COMPILER_ARGS", "-interaction=nonstopmode")
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            retry_policy: RetryPolicy {
                max_attempts,
                initial_delay: Duration::from_millis(initial_delay_ms),
            },
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("invalid boolean '{other}'"),
    }
}
