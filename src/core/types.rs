//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Revision`] - A commit expression or the working-copy sentinel
//! - [`Oid`] - Git object identifier (SHA)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so the rest of the crate never re-checks them.
//!
//! # Examples
//!
//! ```
//! use revdiff::core::types::{Oid, Revision};
//!
//! let rev = Revision::parse("HEAD~2").unwrap();
//! assert_eq!(rev, Revision::Commit("HEAD~2".to_string()));
//! assert_eq!(Revision::parse("WORKTREE").unwrap(), Revision::WorkingCopy);
//!
//! assert!(Revision::parse("").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use std::str::FromStr;

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A revision of the repository to read a document from.
///
/// Either an explicit commit expression (anything `git rev-parse` accepts
/// that peels to a commit: a full or abbreviated hash, a branch, a tag,
/// `HEAD~2`) or the working-copy sentinel, which stands for the file as it
/// currently sits in the checked-out tree.
///
/// # Example
///
/// ```
/// use revdiff::core::types::Revision;
///
/// let rev: Revision = "v1.0".parse().unwrap();
/// assert_eq!(rev.to_string(), "v1.0");
///
/// assert_eq!(Revision::WorkingCopy.to_string(), Revision::WORKING_COPY_SENTINEL);
///
/// // Commit-message searches may contain spaces
/// assert!(Revision::parse(":/fix typo").is_ok());
///
/// // Option-like and multi-line strings are rejected
/// assert!(Revision::parse("--all").is_err());
/// assert!(Revision::parse("a\nb").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Revision {
    /// A commit expression, resolved against the object database.
    Commit(String),
    /// The currently checked-out state of the file.
    #[default]
    WorkingCopy,
}

impl Revision {
    /// Spelling of the working-copy sentinel on the command line.
    pub const WORKING_COPY_SENTINEL: &'static str = "WORKTREE";

    /// Parse a revision identifier.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRevision` if the string is empty, starts
    /// with `-`, or contains control characters.
    pub fn parse(spec: &str) -> Result<Self, TypeError> {
        if spec == Self::WORKING_COPY_SENTINEL {
            return Ok(Revision::WorkingCopy);
        }
        Self::validate(spec)?;
        Ok(Revision::Commit(spec.to_string()))
    }

    fn validate(spec: &str) -> Result<(), TypeError> {
        if spec.is_empty() {
            return Err(TypeError::InvalidRevision(
                "revision cannot be empty".into(),
            ));
        }

        // No ref name or revision syntax starts with '-'; this is a stray flag
        if spec.starts_with('-') {
            return Err(TypeError::InvalidRevision(format!(
                "revision cannot start with '-': {}",
                spec
            )));
        }

        if spec.chars().any(char::is_control) {
            return Err(TypeError::InvalidRevision(format!(
                "revision cannot contain control characters: {:?}",
                spec
            )));
        }

        Ok(())
    }
}

impl FromStr for Revision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Commit(spec) => write!(f, "{}", spec),
            Revision::WorkingCopy => write!(f, "{}", Self::WORKING_COPY_SENTINEL),
        }
    }
}

/// A Git object identifier (SHA-1 or SHA-256 hex string).
///
/// # Example
///
/// ```
/// use revdiff::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
