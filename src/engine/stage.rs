//! engine::stage
//!
//! Run states and the failure taxonomy.
//!
//! # States
//!
//! ```text
//! Start -> ResolveInputs -> MaterializeOld -> MaterializeNew -> RunDiff
//!       -> WriteOutput -> Cleanup -> Done
//! ```
//!
//! `Aborted` is reachable from every state before `Done`. `Done` and
//! `Aborted` are terminal and exclusive.

use std::fmt;

/// A state of one diff run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    /// Open the repository, resolve revisions, locate the engine.
    ResolveInputs,
    /// Produce the old revision's file.
    MaterializeOld,
    /// Produce the new revision's file.
    MaterializeNew,
    /// Run the differencing engine.
    RunDiff,
    /// Persist the engine output.
    WriteOutput,
    /// Tear down the workspace.
    Cleanup,
    Done,
    Aborted,
}

impl Stage {
    /// The stages a successful run passes through, in order.
    pub const HAPPY_PATH: [Stage; 8] = [
        Stage::Start,
        Stage::ResolveInputs,
        Stage::MaterializeOld,
        Stage::MaterializeNew,
        Stage::RunDiff,
        Stage::WriteOutput,
        Stage::Cleanup,
        Stage::Done,
    ];

    /// True for `Done` and `Aborted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }

    /// The state after `self` on a successful run.
    ///
    /// Terminal states have no successor.
    pub fn next(self) -> Option<Stage> {
        let position = Self::HAPPY_PATH.iter().position(|s| *s == self)?;
        Self::HAPPY_PATH.get(position + 1).copied()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::Start => "start",
            Stage::ResolveInputs => "resolving inputs",
            Stage::MaterializeOld => "materializing old revision",
            Stage::MaterializeNew => "materializing new revision",
            Stage::RunDiff => "running differencing engine",
            Stage::WriteOutput => "writing output",
            Stage::Cleanup => "cleaning up",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(text)
    }
}

/// Failure classes, each with a distinct process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Not a repository, bare, or unreadable.
    RepositoryError,
    RevisionNotFound,
    /// The document is not a tracked file at a revision.
    PathNotTracked,
    WorkspaceError,
    DiffEngineNotFound,
    /// Engine exit status outside the allow-lists, signal death, or timeout.
    DiffEngineError,
    WriteError,
    InvalidArguments,
}

impl ErrorClass {
    /// Every class, for exhaustive checks.
    pub const ALL: [ErrorClass; 8] = [
        ErrorClass::RepositoryError,
        ErrorClass::RevisionNotFound,
        ErrorClass::PathNotTracked,
        ErrorClass::WorkspaceError,
        ErrorClass::DiffEngineNotFound,
        ErrorClass::DiffEngineError,
        ErrorClass::WriteError,
        ErrorClass::InvalidArguments,
    ];

    /// Process exit code for this class.
    ///
    /// Repository, revision and path problems share code 3; every other
    /// class has its own.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorClass::InvalidArguments => 2,
            ErrorClass::RepositoryError
            | ErrorClass::RevisionNotFound
            | ErrorClass::PathNotTracked => 3,
            ErrorClass::DiffEngineNotFound => 4,
            ErrorClass::DiffEngineError => 5,
            ErrorClass::WriteError => 6,
            ErrorClass::WorkspaceError => 7,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
