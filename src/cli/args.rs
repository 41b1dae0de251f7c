//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `-t, --tex-file <PATH>`: the document (alias `--file`)
//! - `-o, --old <REV>`: old revision
//! - `-n, --new <REV>`: new revision, `WORKTREE` by default
//! - `-O, --output <PATH>` / `--stdout`: where the diff goes
//! - `--repo`, `--engine`, `--engine-arg`, `--timeout`: overrides
//! - `--cwd`, `--debug`, `-q/--quiet`: global behavior
//! - `--completions <SHELL>`: print a completion script and exit

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::core::types::{Revision, TypeError};
use crate::engine::DiffRequest;
use crate::output::OutputTarget;

/// Errors from turning parsed arguments into a request.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// A required argument was not given.
    #[error("missing required argument {0}")]
    Missing(&'static str),
}

/// revdiff - Diff a LaTeX document between two Git revisions
#[derive(Parser, Debug)]
#[command(name = "revdiff")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Compare the previous commit with the working copy
    revdiff -t paper.tex -o HEAD~1

    # Compare two tags, write to a chosen file
    revdiff -t paper.tex -o v1.0 -n v2.0 -O review/changes.tex

    # Print the diff instead of writing a file
    revdiff -t paper.tex -o main --stdout

    # Pass options through to latexdiff
    revdiff -t paper.tex -o HEAD~3 --engine-arg=--type=CFONT

REVISIONS:
    Anything git accepts that names a commit: a full or abbreviated hash,
    a branch, a tag, HEAD~2. WORKTREE names the checked-out file.")]
pub struct Cli {
    /// Document to compare
    #[arg(
        short = 't',
        long = "tex-file",
        visible_alias = "file",
        value_name = "PATH",
        required_unless_present = "completions"
    )]
    pub tex_file: Option<PathBuf>,

    /// Old revision
    #[arg(
        short = 'o',
        long = "old",
        value_name = "REV",
        value_parser = parse_revision,
        required_unless_present = "completions"
    )]
    pub old: Option<Revision>,

    /// New revision
    #[arg(
        short = 'n',
        long = "new",
        value_name = "REV",
        value_parser = parse_revision,
        default_value = Revision::WORKING_COPY_SENTINEL
    )]
    pub new: Revision,

    /// Output file [default: <stem>-diff.<ext> next to the document]
    #[arg(short = 'O', long, value_name = "PATH", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the diff to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Repository root [default: discovered from the document]
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Differencing program [default: latexdiff]
    #[arg(long, value_name = "PROGRAM")]
    pub engine: Option<String>,

    /// Extra argument for the differencing program (repeatable)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Seconds to wait for the differencing program [default: 300]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Run as if revdiff was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Where the diff should go.
    pub fn output_target(&self) -> OutputTarget {
        match (&self.output, self.stdout) {
            (_, true) => OutputTarget::Stdout,
            (Some(path), false) => OutputTarget::Path(path.clone()),
            (None, false) => OutputTarget::Derived,
        }
    }

    /// Build the run request.
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError::Missing`] if the document or old revision is absent.
    pub fn request(&self) -> Result<DiffRequest, ArgsError> {
        let input = self
            .tex_file
            .clone()
            .ok_or(ArgsError::Missing("--tex-file"))?;
        let old = self.old.clone().ok_or(ArgsError::Missing("--old"))?;

        let mut request = DiffRequest::new(input, old)
            .with_new(self.new.clone())
            .with_output(self.output_target());
        if let Some(repo) = &self.repo {
            request = request.with_repo(repo);
        }
        Ok(request)
    }
}

fn parse_revision(spec: &str) -> Result<Revision, TypeError> {
    Revision::parse(spec)
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
