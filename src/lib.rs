//! revdiff - Diff one LaTeX document between two Git revisions
//!
//! revdiff retrieves two revisions of a tracked document, hands them to an
//! external differencing engine (latexdiff by default), and writes the
//! annotated result next to the document as `<stem>-diff.<ext>`.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Resolve → Materialize → Diff → Write → Cleanup
//! - [`core`] - Domain types and configuration
//! - [`git`] - Single interface for all Git reads
//! - [`workspace`] - Private temporary directory for one run
//! - [`diff`] - The differencing engine and its exit-status policy
//! - [`output`] - Output naming and atomic writes
//! - [`ui`] - Status output and logging
//!
//! # Correctness Invariants
//!
//! 1. The repository and working copy are never modified
//! 2. Temporary files never outlive a run, successful or not
//! 3. The output file is either fully written or untouched
//! 4. Every failure class has its own exit code

pub mod cli;
pub mod core;
pub mod diff;
pub mod engine;
pub mod git;
pub mod output;
pub mod ui;
pub mod workspace;
