//! engine
//!
//! Orchestrates one diff run: resolve, materialize, diff, write, clean up.
//!
//! # Architecture
//!
//! The engine is the only component that knows the order of operations. It
//! drives the [`crate::git`] materializer, the [`crate::workspace`], a
//! [`DiffTool`](crate::diff::DiffTool) and the [`crate::output`] writer
//! through the states in [`Stage`]:
//!
//! ```text
//! Start -> ResolveInputs -> MaterializeOld -> MaterializeNew -> RunDiff
//!       -> WriteOutput -> Cleanup -> Done
//! ```
//!
//! # Invariants
//!
//! - Every run ends in exactly one of `Done` or `Aborted`
//! - The workspace is removed on every path, before a failure is reported
//! - The repository is only read, never modified
//! - Only the output file outlives the run
//!
//! # Example
//!
//! ```ignore
//! use revdiff::engine::{run, Context, DiffRequest};
//! use revdiff::diff::ExternalEngine;
//!
//! let request = DiffRequest::new("paper.tex", Revision::parse("HEAD~1")?);
//! let report = run(&Context::default(), &request, &ExternalEngine::latexdiff())?;
//! println!("wrote {}", report.output.unwrap().display());
//! ```

pub mod runner;
pub mod stage;

pub use runner::{
    discovery_root, run, DiffRequest, FailureSource, ResolvedRevision, RunError, RunReport,
};
pub use stage::{ErrorClass, Stage};

use std::path::PathBuf;

/// Execution context for a run.
///
/// Settings from CLI flags and configuration that affect where a run
/// happens, but not what it compares. Verbosity is not here: it is applied
/// once, when logging is initialized.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Directory under which the workspace is created.
    pub temp_dir: Option<PathBuf>,
}
