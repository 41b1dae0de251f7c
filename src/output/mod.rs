//! output
//!
//! Persisting the annotated document.
//!
//! # Naming
//!
//! Without an explicit target, the output lands next to the input with
//! [`DIFF_SUFFIX`] inserted before the extension: `paper.tex` becomes
//! `paper-diff.tex`, `a.b.tex` becomes `a.b-diff.tex`, `notes` becomes
//! `notes-diff`.
//!
//! # Atomicity
//!
//! Content is written to a temporary file in the target directory and
//! renamed into place, so the target either keeps its previous content or
//! holds the complete new content. A replaced file keeps its permissions; a
//! new one gets the same mode `fs::write` would give it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Suffix inserted before the extension of a derived output name.
pub const DIFF_SUFFIX: &str = "-diff";

/// Errors from writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write output file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write output to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Where a run's output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// `<dir>/<stem>-diff.<ext>` next to the input.
    #[default]
    Derived,
    /// An explicit path, used verbatim.
    Path(PathBuf),
    /// Standard output.
    Stdout,
}

/// Derive the default output path for `input`.
///
/// # Example
///
/// ```
/// use revdiff::output::default_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     default_output_path(Path::new("docs/paper.tex")),
///     PathBuf::from("docs/paper-diff.tex")
/// );
/// assert_eq!(default_output_path(Path::new("notes")), PathBuf::from("notes-diff"));
/// ```
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();

    let mut name = stem;
    name.push(DIFF_SUFFIX);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }

    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Write `content` to `explicit_path`, or to the path derived from `input_path`.
///
/// Parent directories of an explicit path are created; an existing file is
/// replaced. Returns the path actually written.
///
/// # Errors
///
/// Returns an [`OutputError`] if the target location is not writable.
pub fn write_output(
    content: &[u8],
    explicit_path: Option<&Path>,
    input_path: &Path,
) -> Result<PathBuf, OutputError> {
    let target = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input_path),
    };

    write_atomic(&target, content)?;
    tracing::debug!(path = %target.display(), bytes = content.len(), "wrote output");
    Ok(target)
}

/// Write `content` to standard output.
///
/// # Errors
///
/// Returns [`OutputError::Stdout`] if stdout is closed or not writable.
pub fn write_stdout(content: &[u8]) -> Result<(), OutputError> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(content)
        .and_then(|_| lock.flush())
        .map_err(OutputError::Stdout)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), OutputError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent).map_err(|e| OutputError::CreateDir {
        path: parent.clone(),
        source: e,
    })?;

    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = temp_file_in(&parent).map_err(write_err)?;
    file.write_all(content).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            file.as_file()
                .set_permissions(existing.permissions())
                .map_err(write_err)?;
        }
    }
    file.as_file().sync_all().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// A temporary file in `dir` whose mode is 0o666 less the umask.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".revdiff-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// True if `a` and `b` name the same existing file.
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
