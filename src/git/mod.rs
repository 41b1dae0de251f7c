//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. Everything here is read-only: the tool never changes refs, the
//! index, or the working copy.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Mapping user paths to repository-relative paths
//! - Revision resolution (anything that peels to a commit)
//! - Materializing a file's bytes at a revision
//!
//! # Example
//!
//! ```ignore
//! use revdiff::core::types::Revision;
//! use revdiff::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let old = git.resolve_commit("HEAD~3")?;
//! let bytes = git.materialize(Path::new("paper.tex"), &Revision::parse("HEAD~3")?)?;
//! println!("{} bytes at {}", bytes.len(), old.oid.short(7));
//! ```

mod interface;

pub use interface::{CommitInfo, Git, GitError, RepoInfo};
