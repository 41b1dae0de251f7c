//! diff::traits
//!
//! Differencing engine trait definition.
//!
//! # Design
//!
//! The orchestrator talks to the engine only through [`DiffTool`], so any
//! implementation (the external subprocess, or a stand-in in tests) can be
//! driven by the same run. Implementations treat the output as opaque
//! bytes and never interpret the markup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::policy::DiffOutcome;

/// Errors from differencing engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be found.
    #[error("differencing engine '{program}' not found")]
    NotFound {
        /// Program name or path as configured
        program: String,
    },

    /// The engine ran and exited with a status outside the success lists.
    #[error("differencing engine '{program}' failed ({}): {}", exit_description(*code), stderr.trim())]
    Failed {
        program: String,
        /// Exit code, `None` if killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The engine did not finish in time and was killed.
    #[error("differencing engine '{program}' timed out after {}s", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    /// The engine could not be started, or its pipes could not be read.
    #[error("failed to run differencing engine '{program}': {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    /// An input file handed to the engine is missing.
    #[error("input file '{path}' does not exist")]
    MissingInput { path: PathBuf },
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

/// Captured result of a successful engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutput {
    /// Standard output of the engine: the annotated document.
    pub content: Vec<u8>,
    /// How the exit status was classified. Never a failure.
    pub outcome: DiffOutcome,
}

/// A differencing engine.
///
/// # Example
///
/// ```ignore
/// use revdiff::diff::{DiffTool, ExternalEngine};
///
/// let engine = ExternalEngine::latexdiff();
/// engine.check_available()?;
/// let out = engine.compute_diff(Path::new("old.tex"), Path::new("new.tex"))?;
/// std::fs::write("diff.tex", &out.content)?;
/// ```
pub trait DiffTool {
    /// Human-readable name for messages and logs.
    fn name(&self) -> &str;

    /// Fail fast if the engine cannot possibly run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the engine is unavailable.
    fn check_available(&self) -> Result<(), EngineError>;

    /// Compare two documents and return the annotated result.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the engine is unavailable
    /// - [`EngineError::Failed`] for an exit status outside the success lists
    /// - [`EngineError::TimedOut`] if the engine stalls
    fn compute_diff(&self, old: &Path, new: &Path) -> Result<DiffOutput, EngineError>;
}
