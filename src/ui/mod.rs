//! ui
//!
//! User-facing output and diagnostic logging.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware status messages
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Design
//!
//! All status output goes through this module to ensure consistent
//! formatting and proper handling of quiet and debug modes.

pub mod logging;
pub mod output;
