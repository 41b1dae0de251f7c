//! diff::policy
//!
//! Exit-status interpretation for differencing engines.
//!
//! Some engines exit non-zero to say "succeeded, and the inputs differ"
//! (`diff` and `cmp` use 1). The codes that count as success are therefore
//! never "zero only"; they are two explicit allow-lists held by an
//! [`ExitPolicy`].

/// Exit codes `latexdiff` uses for a successful run.
pub const LATEXDIFF_SUCCESS_CODES: &[i32] = &[0];

/// Exit codes `latexdiff` uses for "succeeded, differences present".
///
/// Empty: latexdiff exits 0 whether or not the documents differ.
pub const LATEXDIFF_DIFFERENCE_CODES: &[i32] = &[];

/// Exit codes of POSIX `diff` for "succeeded, differences present".
pub const POSIX_DIFF_DIFFERENCE_CODES: &[i32] = &[1];

/// Result of one engine run, classified by an [`ExitPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// The engine exited with a success code.
    Success,
    /// The engine exited with a code documented as "differences found".
    SuccessWithDifferences,
    /// Any other exit. `code` is `None` when the engine died from a signal.
    Failure { code: Option<i32>, stderr: String },
}

impl DiffOutcome {
    /// True unless this is a [`DiffOutcome::Failure`].
    pub fn is_success(&self) -> bool {
        !matches!(self, DiffOutcome::Failure { .. })
    }
}

/// Which exit codes count as success.
///
/// # Example
///
/// ```
/// use revdiff::diff::{DiffOutcome, ExitPolicy, POSIX_DIFF_DIFFERENCE_CODES};
///
/// let policy = ExitPolicy::new([0], POSIX_DIFF_DIFFERENCE_CODES.iter().copied());
/// assert_eq!(policy.classify(Some(0), ""), DiffOutcome::Success);
/// assert_eq!(policy.classify(Some(1), ""), DiffOutcome::SuccessWithDifferences);
/// assert!(!policy.classify(Some(2), "boom").is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitPolicy {
    success_codes: Vec<i32>,
    difference_codes: Vec<i32>,
}

impl ExitPolicy {
    /// Build a policy from two allow-lists.
    ///
    /// A code present in both lists counts as plain success.
    pub fn new(
        success_codes: impl IntoIterator<Item = i32>,
        difference_codes: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            success_codes: success_codes.into_iter().collect(),
            difference_codes: difference_codes.into_iter().collect(),
        }
    }

    /// The policy for `latexdiff`.
    pub fn latexdiff() -> Self {
        Self::new(
            LATEXDIFF_SUCCESS_CODES.iter().copied(),
            LATEXDIFF_DIFFERENCE_CODES.iter().copied(),
        )
    }

    /// Codes counted as plain success.
    pub fn success_codes(&self) -> &[i32] {
        &self.success_codes
    }

    /// Codes counted as success with differences.
    pub fn difference_codes(&self) -> &[i32] {
        &self.difference_codes
    }

    /// Classify an exit code (`None` for death by signal).
    pub fn classify(&self, code: Option<i32>, stderr: &str) -> DiffOutcome {
        match code {
            Some(c) if self.success_codes.contains(&c) => DiffOutcome::Success,
            Some(c) if self.difference_codes.contains(&c) => DiffOutcome::SuccessWithDifferences,
            _ => DiffOutcome::Failure {
                code,
                stderr: stderr.to_string(),
            },
        }
    }
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self::latexdiff()
    }
}
