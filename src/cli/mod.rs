//! cli
//!
//! Command-line interface layer for revdiff.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Load configuration and build the differencing engine
//! - Delegate the run to [`crate::engine`]
//! - Map failures to exit codes
//!
//! # Architecture
//!
//! The CLI layer is thin. Precedence between flags and configuration is
//! decided here; everything about the run itself lives in the engine.

pub mod args;
pub mod completion;

pub use args::{ArgsError, Cli, Shell};

use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::core::config::{Config, ConfigError};
use crate::core::types::TypeError;
use crate::diff::{DiffOutcome, ExternalEngine};
use crate::engine::{self, DiffRequest, ErrorClass, ResolvedRevision, RunError, RunReport};
use crate::git::{Git, RepoInfo};
use crate::ui::logging;
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(shell) = cli.completions {
        return completion::completion(shell, &mut std::io::stdout());
    }

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    logging::init(verbosity);

    let request = cli.request()?;
    let cwd = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    let loaded = Config::load(discover_repo(&cwd, &request).as_ref())
        .context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(&warning.message, verbosity);
    }
    let config = loaded.config;

    let tool = build_engine(&cli, &config);
    let ctx = engine::Context {
        cwd: Some(cwd),
        temp_dir: config.temp_dir().map(Path::to_path_buf),
    };

    let report = engine::run(&ctx, &request, &tool)?;
    report_success(&report, verbosity);
    Ok(())
}

/// Exit code for an error returned by [`run`].
///
/// Walks the error chain for a known failure; anything else is an internal
/// error (1).
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(run_err) = cause.downcast_ref::<RunError>() {
            return run_err.exit_code();
        }
        if cause.is::<ConfigError>() || cause.is::<ArgsError>() || cause.is::<TypeError>() {
            return ErrorClass::InvalidArguments.exit_code();
        }
    }
    1
}

/// Repository used to find repo-scoped configuration.
///
/// Failures are ignored here; the run reports them with the right class.
fn discover_repo(cwd: &Path, request: &DiffRequest) -> Option<RepoInfo> {
    let start = engine::discovery_root(cwd, request);
    Git::open(&start).ok()?.info().ok()
}

/// Engine from configuration, with command-line overrides applied.
///
/// `--engine-arg` values replace configured arguments rather than adding
/// to them.
fn build_engine(cli: &Cli, config: &Config) -> ExternalEngine {
    let program = cli
        .engine
        .clone()
        .unwrap_or_else(|| config.engine_program());
    let args = if cli.engine_args.is_empty() {
        config.engine_args()
    } else {
        cli.engine_args.clone()
    };
    let timeout = cli
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.engine_timeout());

    ExternalEngine::new(program)
        .with_args(args)
        .with_policy(config.exit_policy())
        .with_timeout(timeout)
}

fn report_success(report: &RunReport, verbosity: Verbosity) {
    output::print(
        format!(
            "Compared {}: {} -> {}",
            report.relative_path.display(),
            describe(&report.old),
            describe(&report.new)
        ),
        verbosity,
    );
    if report.outcome == DiffOutcome::Success && report.bytes == 0 {
        output::warn("differencing engine produced no output", verbosity);
    }
    if let Some(path) = &report.output {
        output::print(format!("Wrote {}", path.display()), verbosity);
    }
}

fn describe(revision: &ResolvedRevision) -> String {
    let spec = revision.revision.to_string();
    match &revision.commit {
        Some(commit) => output::format_revision(
            &spec,
            Some(commit.oid.short(7)),
            Some(commit.summary.as_str()),
        ),
        None => output::format_revision(&spec, None, None),
    }
}
