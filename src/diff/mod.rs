//! diff
//!
//! Invocation of the external differencing engine.
//!
//! # Modules
//!
//! - [`traits`] - The [`DiffTool`] seam and its error type
//! - [`engine`] - [`ExternalEngine`], the subprocess implementation
//! - [`policy`] - Exit-code allow-lists and outcome classification
//!
//! # Design
//!
//! The engine's output is opaque: this crate never parses or validates the
//! markup it produces. Success is decided only by the exit status, through
//! an explicit [`ExitPolicy`].

pub mod engine;
pub mod policy;
pub mod traits;

pub use engine::{ExternalEngine, DEFAULT_TIMEOUT, LATEXDIFF_PROGRAM};
pub use policy::{
    DiffOutcome, ExitPolicy, LATEXDIFF_DIFFERENCE_CODES, LATEXDIFF_SUCCESS_CODES,
    POSIX_DIFF_DIFFERENCE_CODES,
};
pub use traits::{DiffOutput, DiffTool, EngineError};
