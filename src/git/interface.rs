//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to the repository. All
//! object-database reads flow through this interface, which provides
//! structured results and normalizes errors into typed failure categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RevisionNotFound`]: Revision does not resolve to a commit
//! - [`GitError::PathNotTracked`]: File absent at the requested revision
//! - [`GitError::PathOutsideRepo`]: Path is not under the working copy
//!
//! # Example
//!
//! ```ignore
//! use revdiff::core::types::Revision;
//! use revdiff::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let bytes = git.materialize(Path::new("paper.tex"), &Revision::parse("HEAD~1")?)?;
//! ```

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::core::types::{Oid, Revision, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Revision does not name a commit.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// The revision as given by the user
        revision: String,
        /// Why resolution failed
        reason: String,
    },

    /// The path is not a tracked file at the given revision.
    #[error("'{path}' is not tracked at {revision}")]
    PathNotTracked {
        /// Repository-relative path
        path: PathBuf,
        /// The revision that was searched
        revision: String,
    },

    /// The path does not live inside the repository's working copy.
    #[error("'{path}' is outside the repository at {work_dir}")]
    PathOutsideRepo {
        /// The offending path
        path: PathBuf,
        /// The repository working directory
        work_dir: PathBuf,
    },

    /// Reading the checked-out copy of a tracked file failed.
    #[error("failed to read '{path}' from the working copy: {source}")]
    WorkingCopyRead {
        /// Absolute path of the file
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Map a git2 failure from revision parsing.
    fn from_revparse(err: git2::Error, revision: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound
            | git2::ErrorCode::InvalidSpec
            | git2::ErrorCode::Ambiguous
            | git2::ErrorCode::UnbornBranch
            | git2::ErrorCode::Peel => GitError::RevisionNotFound {
                revision: revision.to_string(),
                reason: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", revision, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRevision(msg) => GitError::RevisionNotFound {
                revision: msg.clone(),
                reason: msg,
            },
        }
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// Information about a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2` directly. Every operation here is a read; nothing touches
/// refs, the index, or the working copy.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository information (git_dir and work_dir paths).
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let git_dir = self.repo.path().to_path_buf();
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(RepoInfo { git_dir, work_dir })
    }

    /// Working directory, canonicalized so it can be compared with user paths.
    pub fn work_dir(&self) -> Result<PathBuf, GitError> {
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?;
        work_dir
            .canonicalize()
            .map_err(|e| GitError::WorkingCopyRead {
                path: work_dir.to_path_buf(),
                source: e,
            })
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Express `path` relative to the working directory.
    ///
    /// Relative inputs are taken relative to `base`. The parent directory is
    /// canonicalized (the file itself need not exist in the working copy, it
    /// may only exist in history).
    ///
    /// # Errors
    ///
    /// - [`GitError::PathOutsideRepo`] if the path is not under the working copy
    pub fn relative_path(&self, path: &Path, base: &Path) -> Result<PathBuf, GitError> {
        let work_dir = self.work_dir()?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        };

        let outside = || GitError::PathOutsideRepo {
            path: absolute.clone(),
            work_dir: work_dir.clone(),
        };

        let file_name = absolute.file_name().ok_or_else(outside)?.to_os_string();
        let parent = absolute.parent().ok_or_else(outside)?;
        let parent = parent.canonicalize().map_err(|_| outside())?;

        let relative = parent
            .strip_prefix(&work_dir)
            .map_err(|_| outside())?
            .join(file_name);

        // Refuse to look inside the repository's own metadata
        if relative.components().next() == Some(Component::Normal(".git".as_ref())) {
            return Err(outside());
        }

        Ok(relative)
    }

    // =========================================================================
    // Revision Resolution
    // =========================================================================

    /// Resolve a commit expression to the commit it names.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if the expression is unknown, ambiguous,
    ///   or names something that is not a commit
    pub fn resolve_commit(&self, revision: &str) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(revision)?;
        Ok(CommitInfo {
            oid: Oid::new(commit.id().to_string())?,
            summary: commit.summary().unwrap_or_default().to_string(),
        })
    }

    fn find_commit(&self, revision: &str) -> Result<git2::Commit<'_>, GitError> {
        let object = self
            .repo
            .revparse_single(revision)
            .map_err(|e| GitError::from_revparse(e, revision))?;

        object
            .peel_to_commit()
            .map_err(|e| GitError::RevisionNotFound {
                revision: revision.to_string(),
                reason: e.message().to_string(),
            })
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    /// Produce the exact bytes of `relative_path` at `revision`.
    ///
    /// For [`Revision::WorkingCopy`] the file is read from the checked-out
    /// tree, after checking that it is tracked (present in the index).
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if the revision does not name a commit
    /// - [`GitError::PathNotTracked`] if the path is not a file at that revision
    pub fn materialize(&self, relative_path: &Path, revision: &Revision) -> Result<Vec<u8>, GitError> {
        match revision {
            Revision::Commit(spec) => self.read_file_at(relative_path, spec),
            Revision::WorkingCopy => {
                let path = self.working_copy_path(relative_path)?;
                std::fs::read(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => GitError::PathNotTracked {
                        path: relative_path.to_path_buf(),
                        revision: revision.to_string(),
                    },
                    _ => GitError::WorkingCopyRead { path, source: e },
                })
            }
        }
    }

    /// Absolute path of a tracked file in the working copy.
    ///
    /// # Errors
    ///
    /// - [`GitError::PathNotTracked`] if the path is not in the index or is
    ///   missing on disk
    pub fn working_copy_path(&self, relative_path: &Path) -> Result<PathBuf, GitError> {
        let not_tracked = || GitError::PathNotTracked {
            path: relative_path.to_path_buf(),
            revision: Revision::WORKING_COPY_SENTINEL.to_string(),
        };

        let index = self.repo.index()?;
        let entry_path = tree_path(relative_path).ok_or_else(not_tracked)?;
        if index.get_path(Path::new(&entry_path), 0).is_none() {
            return Err(not_tracked());
        }

        let path = self.work_dir()?.join(relative_path);
        if !path.is_file() {
            return Err(not_tracked());
        }
        Ok(path)
    }

    fn read_file_at(&self, relative_path: &Path, revision: &str) -> Result<Vec<u8>, GitError> {
        let not_tracked = || GitError::PathNotTracked {
            path: relative_path.to_path_buf(),
            revision: revision.to_string(),
        };

        let commit = self.find_commit(revision)?;
        let tree = commit.tree()?;
        let entry_path = tree_path(relative_path).ok_or_else(not_tracked)?;

        let entry = match tree.get_path(Path::new(&entry_path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Err(not_tracked()),
            Err(e) => return Err(e.into()),
        };

        // Directories and submodules are not documents
        if entry.kind() != Some(git2::ObjectType::Blob) {
            return Err(not_tracked());
        }

        let blob = self.repo.find_blob(entry.id())?;
        Ok(blob.content().to_vec())
    }
}

/// Join path components with `/`, the separator git trees and the index use.
///
/// Returns `None` for paths that cannot name a tree entry (empty, absolute,
/// or containing `..`).
fn tree_path(relative_path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
