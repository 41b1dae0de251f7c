//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Status messages go to stderr and respect the quiet flag; stdout is
//! reserved for the diff itself when `--stdout` is used.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    ///
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a status message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a revision label for display: `c1 (3f2a9c1 Add intro)`.
pub fn format_revision(spec: &str, short_oid: Option<&str>, summary: Option<&str>) -> String {
    match (short_oid, summary) {
        (Some(oid), Some(summary)) if !summary.is_empty() => {
            format!("{} ({} {})", spec, oid, summary)
        }
        (Some(oid), _) if oid != spec => format!("{} ({})", spec, oid),
        _ => spec.to_string(),
    }
}
