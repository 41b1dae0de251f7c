//! workspace
//!
//! Scoped temporary storage for one run.
//!
//! # Design
//!
//! A [`Workspace`] owns a uniquely named private directory
//! (`revdiff-XXXXXX`) under the system temp dir or a configured root. Slots
//! are file paths reserved inside it. The directory is removed by
//! [`Workspace::release`] or, if the run bails out early, when the
//! workspace is dropped. A removal failure on drop is logged and swallowed
//! so it never replaces the error that caused the early exit.
//!
//! # Invariants
//!
//! - Slot paths are unique within a workspace
//! - Slot paths always live inside the workspace directory
//! - After release or drop, no slot remains on disk

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

/// Prefix of workspace directory names.
pub const WORKSPACE_PREFIX: &str = "revdiff-";

/// Errors from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create temporary workspace under '{root}': {source}")]
    Create {
        root: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write temporary file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove temporary workspace '{path}': {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A private temporary directory holding materialized revisions.
///
/// # Example
///
/// ```
/// use revdiff::workspace::Workspace;
///
/// let mut ws = Workspace::create(None).unwrap();
/// let old = ws.write_slot("paper.tex", b"A\n").unwrap();
/// let new = ws.write_slot("paper.tex", b"A B\n").unwrap();
/// assert_ne!(old, new);
///
/// let dir = ws.path().to_path_buf();
/// ws.release().unwrap();
/// assert!(!dir.exists());
/// ```
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
    allocated: HashSet<OsString>,
}

impl Workspace {
    /// Create a new workspace.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Create`] if the directory cannot be created.
    pub fn create(root: Option<&Path>) -> Result<Self, WorkspaceError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| WorkspaceError::Create {
            root: root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir),
            source: e,
        })?;

        let path = dir.path().to_path_buf();
        tracing::debug!(path = %path.display(), "created workspace");

        Ok(Self {
            dir: Some(dir),
            path,
            allocated: HashSet::new(),
        })
    }

    /// Path of the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserve a unique path inside the workspace.
    ///
    /// Only the final component of `suggested_name` is used, so a suggestion
    /// can never escape the directory. Repeated names get a numeric suffix
    /// ahead of the extension (`paper.tex`, `paper-1.tex`, ...) so the
    /// engine still sees the original file type.
    pub fn allocate_slot(&mut self, suggested_name: &str) -> PathBuf {
        let base = Path::new(suggested_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("slot"));

        let mut candidate = base.clone();
        let mut n = 0usize;
        while self.allocated.contains(&candidate) {
            n += 1;
            candidate = numbered(&base, n);
        }

        self.allocated.insert(candidate.clone());
        self.path.join(candidate)
    }

    /// Reserve a slot and fill it with `content`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Write`] if the file cannot be written.
    pub fn write_slot(&mut self, suggested_name: &str, content: &[u8]) -> Result<PathBuf, WorkspaceError> {
        let path = self.allocate_slot(suggested_name);
        fs::write(&path, content).map_err(|e| WorkspaceError::Write {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote slot");
        Ok(path)
    }

    /// Remove every slot and the directory itself.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Remove`] if the directory cannot be removed.
    pub fn release(mut self) -> Result<(), WorkspaceError> {
        match self.dir.take() {
            Some(dir) => dir.close().map_err(|e| WorkspaceError::Remove {
                path: self.path.clone(),
                source: e,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(err) = dir.close() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to remove temporary workspace"
                );
            }
        }
    }
}

/// `paper.tex` + 2 -> `paper-2.tex`; `Makefile` + 2 -> `Makefile-2`.
fn numbered(name: &OsString, n: usize) -> OsString {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut out = OsString::from(format!("{}-{}", stem, n));
    if let Some(ext) = path.extension() {
        out.push(".");
        out.push(ext);
    }
    out
}
