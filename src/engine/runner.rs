//! engine::runner
//!
//! The diff run itself.
//!
//! # Architecture
//!
//! [`run`] walks the states in [`Stage`] in order. Each step either advances
//! or aborts the run with a [`RunError`] that records the stage it failed in.
//! Component errors are carried unmodified inside [`FailureSource`], which
//! maps each of them to exactly one [`ErrorClass`].
//!
//! # Invariants
//!
//! - Revisions and the engine are checked before any temporary file exists
//! - The [`Workspace`] is owned by the run; an early return drops it, which
//!   removes the directory before the caller sees the error
//! - A working-copy revision is handed to the engine in place, never copied
//! - A failed release after a successful run is logged, not reported

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::stage::{ErrorClass, Stage};
use super::Context;
use crate::core::types::Revision;
use crate::diff::{DiffOutcome, DiffTool, EngineError};
use crate::git::{CommitInfo, Git, GitError};
use crate::output::{self, OutputError, OutputTarget};
use crate::workspace::{Workspace, WorkspaceError};

/// What to compare and where to put the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRequest {
    /// The document, absolute or relative to the working directory.
    pub input: PathBuf,
    /// The old revision.
    pub old: Revision,
    /// The new revision, the working copy unless set.
    pub new: Revision,
    /// Output destination.
    pub output: OutputTarget,
    /// Repository root; discovered from the input when `None`.
    pub repo: Option<PathBuf>,
}

impl DiffRequest {
    /// Compare `input` at `old` against the working copy.
    pub fn new(input: impl Into<PathBuf>, old: Revision) -> Self {
        Self {
            input: input.into(),
            old,
            new: Revision::WorkingCopy,
            output: OutputTarget::Derived,
            repo: None,
        }
    }

    /// Set the new revision.
    pub fn with_new(mut self, new: Revision) -> Self {
        self.new = new;
        self
    }

    /// Set the output destination.
    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Set the repository root.
    pub fn with_repo(mut self, repo: impl Into<PathBuf>) -> Self {
        self.repo = Some(repo.into());
        self
    }
}

/// The component error that aborted a run.
#[derive(Debug, Error)]
pub enum FailureSource {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

impl FailureSource {
    /// The failure class, which decides the exit code.
    pub fn class(&self) -> ErrorClass {
        match self {
            FailureSource::Git(err) => match err {
                GitError::RevisionNotFound { .. } => ErrorClass::RevisionNotFound,
                GitError::PathNotTracked { .. } | GitError::PathOutsideRepo { .. } => {
                    ErrorClass::PathNotTracked
                }
                GitError::NotARepo { .. }
                | GitError::BareRepo
                | GitError::WorkingCopyRead { .. }
                | GitError::InvalidOid { .. }
                | GitError::Internal { .. } => ErrorClass::RepositoryError,
            },
            FailureSource::Workspace(_) => ErrorClass::WorkspaceError,
            FailureSource::Engine(err) => match err {
                EngineError::NotFound { .. } => ErrorClass::DiffEngineNotFound,
                EngineError::Failed { .. }
                | EngineError::TimedOut { .. }
                | EngineError::Io { .. }
                | EngineError::MissingInput { .. } => ErrorClass::DiffEngineError,
            },
            FailureSource::Output(_) => ErrorClass::WriteError,
            FailureSource::InvalidArguments(_) => ErrorClass::InvalidArguments,
        }
    }
}

/// A run that reached `Aborted`.
#[derive(Debug, Error)]
#[error("{stage} failed")]
pub struct RunError {
    /// The state the run was in when it failed.
    pub stage: Stage,
    /// What went wrong.
    #[source]
    pub source: FailureSource,
}

impl RunError {
    /// The failure class.
    pub fn class(&self) -> ErrorClass {
        self.source.class()
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        self.class().exit_code()
    }
}

/// A revision as requested, plus the commit it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRevision {
    pub revision: Revision,
    /// `None` for the working copy.
    pub commit: Option<CommitInfo>,
}

/// Summary of a run that reached `Done`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Repository-relative path of the document.
    pub relative_path: PathBuf,
    pub old: ResolvedRevision,
    pub new: ResolvedRevision,
    /// The file written, `None` when the diff went to stdout.
    pub output: Option<PathBuf>,
    /// How the engine's exit status was classified.
    pub outcome: DiffOutcome,
    /// Size of the engine output in bytes.
    pub bytes: usize,
    /// Every state the run passed through, `Start` through `Done`.
    pub stages: Vec<Stage>,
}

/// Inputs after `ResolveInputs`.
struct Resolved {
    git: Git,
    /// Absolute path of the document as the user named it.
    input: PathBuf,
    relative: PathBuf,
    old: ResolvedRevision,
    new: ResolvedRevision,
    /// `None` means stdout.
    output: Option<PathBuf>,
}

/// Records state transitions and turns failures into [`RunError`]s.
struct Transitions {
    stages: Vec<Stage>,
}

impl Transitions {
    fn start() -> Self {
        tracing::debug!(stage = %Stage::Start, "entering stage");
        Self {
            stages: vec![Stage::Start],
        }
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(stage = %stage, "entering stage");
        self.stages.push(stage);
    }

    fn current(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Start)
    }

    fn abort(&self, source: impl Into<FailureSource>) -> RunError {
        let stage = self.current();
        let source = source.into();
        tracing::debug!(stage = %stage, class = %source.class(), "run aborted");
        RunError { stage, source }
    }
}

/// Run one diff from start to a terminal state.
///
/// # Errors
///
/// Returns a [`RunError`] naming the stage that failed. By the time it is
/// returned the workspace has been removed.
pub fn run(
    ctx: &Context,
    request: &DiffRequest,
    tool: &dyn DiffTool,
) -> Result<RunReport, RunError> {
    let mut transitions = Transitions::start();

    transitions.enter(Stage::ResolveInputs);
    let resolved = resolve_inputs(ctx, request, tool).map_err(|e| transitions.abort(e))?;

    transitions.enter(Stage::MaterializeOld);
    let mut workspace =
        Workspace::create(ctx.temp_dir.as_deref()).map_err(|e| transitions.abort(e))?;
    let old_path = materialize(&resolved, &resolved.old, "old", &mut workspace)
        .map_err(|e| transitions.abort(e))?;

    transitions.enter(Stage::MaterializeNew);
    let new_path = materialize(&resolved, &resolved.new, "new", &mut workspace)
        .map_err(|e| transitions.abort(e))?;

    transitions.enter(Stage::RunDiff);
    let diff = tool
        .compute_diff(&old_path, &new_path)
        .map_err(|e| transitions.abort(e))?;

    transitions.enter(Stage::WriteOutput);
    let written = match &resolved.output {
        Some(path) => Some(
            output::write_output(&diff.content, Some(path), &resolved.input)
                .map_err(|e| transitions.abort(e))?,
        ),
        None => {
            output::write_stdout(&diff.content).map_err(|e| transitions.abort(e))?;
            None
        }
    };

    transitions.enter(Stage::Cleanup);
    if let Err(err) = workspace.release() {
        tracing::warn!(error = %err, "failed to remove workspace after a successful run");
    }

    transitions.enter(Stage::Done);
    Ok(RunReport {
        relative_path: resolved.relative,
        old: resolved.old,
        new: resolved.new,
        output: written,
        outcome: diff.outcome,
        bytes: diff.content.len(),
        stages: transitions.stages,
    })
}

fn resolve_inputs(
    ctx: &Context,
    request: &DiffRequest,
    tool: &dyn DiffTool,
) -> Result<Resolved, FailureSource> {
    if request.input.as_os_str().is_empty() {
        return Err(FailureSource::InvalidArguments(
            "no input document given".to_string(),
        ));
    }

    let cwd = match &ctx.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| {
            FailureSource::InvalidArguments(format!("cannot determine working directory: {}", e))
        })?,
    };

    let input = cwd.join(&request.input);
    let git = Git::open(&discovery_root(&cwd, request))?;
    let relative = git.relative_path(&input, &cwd)?;
    tracing::debug!(
        work_dir = %git.work_dir()?.display(),
        path = %relative.display(),
        "resolved document"
    );

    let old = resolve_revision(&git, &relative, &request.old)?;
    let new = resolve_revision(&git, &relative, &request.new)?;

    let output = match &request.output {
        OutputTarget::Derived => Some(output::default_output_path(&input)),
        OutputTarget::Path(path) => {
            let path = cwd.join(path);
            if output::same_file(&path, &input) {
                return Err(FailureSource::InvalidArguments(format!(
                    "output path '{}' is the input document",
                    path.display()
                )));
            }
            Some(path)
        }
        OutputTarget::Stdout => None,
    };

    tool.check_available()?;

    Ok(Resolved {
        git,
        input,
        relative,
        old,
        new,
        output,
    })
}

/// Directory from which the repository is discovered.
///
/// The explicit repository if one was given, otherwise the nearest existing
/// directory above the document (which may only exist in history).
pub fn discovery_root(cwd: &Path, request: &DiffRequest) -> PathBuf {
    match &request.repo {
        Some(repo) => cwd.join(repo),
        None => cwd
            .join(&request.input)
            .ancestors()
            .skip(1)
            .find(|dir| dir.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf()),
    }
}

fn resolve_revision(
    git: &Git,
    relative: &Path,
    revision: &Revision,
) -> Result<ResolvedRevision, GitError> {
    let commit = match revision {
        Revision::Commit(spec) => {
            let info = git.resolve_commit(spec)?;
            tracing::debug!(revision = %spec, oid = %info.oid, "resolved revision");
            Some(info)
        }
        Revision::WorkingCopy => {
            git.working_copy_path(relative)?;
            None
        }
    };

    Ok(ResolvedRevision {
        revision: revision.clone(),
        commit,
    })
}

/// Path of a file holding `relative` at `revision`, for the engine.
fn materialize(
    resolved: &Resolved,
    revision: &ResolvedRevision,
    label: &str,
    workspace: &mut Workspace,
) -> Result<PathBuf, FailureSource> {
    match &revision.revision {
        Revision::WorkingCopy => Ok(resolved.git.working_copy_path(&resolved.relative)?),
        Revision::Commit(_) => {
            let content = resolved
                .git
                .materialize(&resolved.relative, &revision.revision)?;
            let file_name = resolved
                .relative
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            let path = workspace.write_slot(&format!("{}-{}", label, file_name), &content)?;
            Ok(path)
        }
    }
}
