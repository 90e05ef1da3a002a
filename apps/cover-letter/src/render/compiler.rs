//! Artifact Compiler: writes the rendered LaTeX source and runs the external compiler.
//!
//! Success is decided only by whether `cover_letter.pdf` exists afterwards. The exit status
//! is logged but never consulted, so a failing compiler that still leaves output counts as
//! success, and a stale PDF from an earlier run does too (logged as a warning).

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;

/// File stem shared by the working source and the compiled artifact.
pub const DOCUMENT_STEM: &str = "cover_letter";
/// Lines of compiler output kept in the log when no artifact appears.
const LOG_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Failed to write document '{}': {source}", .path.display())]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No output produced: expected '{}'", .expected.display())]
    NoOutput { expected: PathBuf },
}

/// Runs `<program> <args...> cover_letter.tex` inside `work_dir`.
#[derive(Debug, Clone)]
pub struct ArtifactCompiler {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl ArtifactCompiler {
    pub fn new(program: impl Into<String>, args: Vec<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir: work_dir.into(),
        }
    }

    /// Builds the compiler from config. With `isolate_work_dir` set, this run gets its own
    /// `<work_dir>/<uuid>` subdirectory so concurrent runs never share working files.
    pub fn from_config(config: &Config) -> Self {
        let work_dir = if config.isolate_work_dir {
            config.work_dir.join(Uuid::new_v4().to_string())
        } else {
            config.work_dir.clone()
        };

        Self::new(
            config.latex_compiler.clone(),
            config.latex_compiler_args.clone(),
            work_dir,
        )
    }

    pub fn document_path(&self) -> PathBuf {
        self.work_dir.join(format!("{DOCUMENT_STEM}.tex"))
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(format!("{DOCUMENT_STEM}.pdf"))
    }

    /// Compiles `document` exactly once and returns the artifact path if it exists afterwards.
    pub async fn compile(&self, document: &str) -> Result<PathBuf, CompileError> {
        let document_path = self.document_path();
        let output_path = self.output_path();

        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|source| CompileError::WriteDocument {
                path: document_path.clone(),
                source,
            })?;
        tokio::fs::write(&document_path, document)
            .await
            .map_err(|source| CompileError::WriteDocument {
                path: document_path.clone(),
                source,
            })?;

        if output_exists(&output_path).await {
            warn!(
                "{} already exists before compiling; a stale artifact will be reported as success",
                output_path.display()
            );
        }

        info!(
            "Compiling {} with {}",
            document_path.display(),
            self.program
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(format!("{DOCUMENT_STEM}.tex"))
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .output()
            .await;

        let compiler_log = match output {
            Ok(output) => {
                debug!("{} exited with {}", self.program, output.status);
                if !output.status.success() {
                    warn!("{} exited with {}", self.program, output.status);
                }
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Err(e) => {
                warn!("Failed to run compiler '{}': {e}", self.program);
                String::new()
            }
        };

        if output_exists(&output_path).await {
            info!("Artifact produced at {}", output_path.display());
            Ok(output_path)
        } else {
            debug!("Compiler output tail:\n{}", tail(&compiler_log, LOG_TAIL_LINES));
            Err(CompileError::NoOutput {
                expected: output_path,
            })
        }
    }
}

async fn output_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
