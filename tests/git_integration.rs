//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that materialization matches what git itself reports.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use revdiff::core::types::Revision;
use revdiff::git::{Git, GitError};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-q"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "core.autocrlf", "false"]);

        let repo = Self { dir };
        repo.commit_file("README.md", b"# Test Repo\n", "Initial commit");
        repo
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a Git interface to this repository.
    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    /// Write a file and commit it, returning the new commit id.
    fn commit_file(&self, path: &str, content: &[u8], message: &str) -> String {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-q", "-m", message]);
        self.rev_parse("HEAD")
    }

    fn rev_parse(&self, rev: &str) -> String {
        String::from_utf8(git_output(self.path(), &["rev-parse", rev]))
            .unwrap()
            .trim()
            .to_string()
    }

    /// Bytes of `path` at `rev` according to `git show`.
    fn show(&self, rev: &str, path: &str) -> Vec<u8> {
        git_output(self.path(), &["show", &format!("{}:{}", rev, path)])
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    git_output(dir, args);
}

fn git_output(dir: &Path, args: &[&str]) -> Vec<u8> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    output.stdout
}

fn commit(spec: &str) -> Revision {
    Revision::parse(spec).unwrap()
}

mod open {
    use super::*;

    #[test]
    fn discovers_from_subdirectory() {
        let repo = TestRepo::new();
        repo.commit_file("chapters/intro.tex", b"x\n", "intro");

        let git = Git::open(&repo.path().join("chapters")).unwrap();
        let info = git.info().unwrap();

        assert_eq!(
            info.work_dir.canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn not_a_repo() {
        let dir = TempDir::new().unwrap();
        let err = Git::open(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepo { .. }));
    }

    #[test]
    fn bare_repo_rejected() {
        let dir = TempDir::new().unwrap();
        run_git(dir.path(), &["init", "-q", "--bare"]);
        let err = Git::open(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::BareRepo));
    }
}

mod resolve_commit {
    use super::*;

    #[test]
    fn full_and_abbreviated_hash() {
        let repo = TestRepo::new();
        let oid = repo.commit_file("paper.tex", b"A\n", "Add paper");
        let git = repo.git();

        let full = git.resolve_commit(&oid).unwrap();
        let short = git.resolve_commit(&oid[..8]).unwrap();

        assert_eq!(full.oid.as_str(), oid);
        assert_eq!(full, short);
        assert_eq!(full.summary, "Add paper");
    }

    #[test]
    fn symbolic_names() {
        let repo = TestRepo::new();
        let first = repo.rev_parse("HEAD");
        repo.commit_file("paper.tex", b"A\n", "Add paper");
        run_git(repo.path(), &["tag", "v1"]);
        let git = repo.git();

        assert_eq!(git.resolve_commit("HEAD~1").unwrap().oid.as_str(), first);
        assert_eq!(
            git.resolve_commit("v1").unwrap().oid.as_str(),
            repo.rev_parse("HEAD")
        );
    }

    #[test]
    fn annotated_tag_peels_to_commit() {
        let repo = TestRepo::new();
        run_git(repo.path(), &["tag", "-a", "release", "-m", "Release"]);

        let info = repo.git().resolve_commit("release").unwrap();

        assert_eq!(info.oid.as_str(), repo.rev_parse("HEAD"));
    }

    #[test]
    fn message_search_with_spaces() {
        let repo = TestRepo::new();
        let oid = repo.commit_file("paper.tex", b"A\n", "Fix typo in abstract");
        repo.commit_file("paper.tex", b"B\n", "Rewrite intro");

        let bytes = repo
            .git()
            .materialize(Path::new("paper.tex"), &commit("HEAD^{/Fix typo}"))
            .unwrap();

        assert_eq!(bytes, repo.show(&oid, "paper.tex"));
    }

    #[test]
    fn unknown_revision() {
        let repo = TestRepo::new();
        let err = repo.git().resolve_commit("does-not-exist").unwrap_err();
        assert!(matches!(err, GitError::RevisionNotFound { .. }));
    }

    #[test]
    fn tree_is_not_a_commit() {
        let repo = TestRepo::new();
        let err = repo.git().resolve_commit("HEAD^{tree}").unwrap_err();
        assert!(matches!(err, GitError::RevisionNotFound { .. }));
    }
}

mod materialize {
    use super::*;

    #[test]
    fn byte_identical_to_git_show() {
        let repo = TestRepo::new();
        let content = b"\\documentclass{article}\r\n\xe2\x82\xac caf\xc3\xa9\n\x00binary\n";
        let oid = repo.commit_file("paper.tex", content, "Add paper");
        repo.commit_file("paper.tex", b"changed\n", "Change paper");

        let bytes = repo
            .git()
            .materialize(Path::new("paper.tex"), &commit(&oid))
            .unwrap();

        assert_eq!(bytes, repo.show(&oid, "paper.tex"));
        assert_eq!(bytes, content.to_vec());
    }

    #[test]
    fn nested_path() {
        let repo = TestRepo::new();
        repo.commit_file("chapters/one/intro.tex", b"intro\n", "intro");

        let bytes = repo
            .git()
            .materialize(Path::new("chapters/one/intro.tex"), &commit("HEAD"))
            .unwrap();

        assert_eq!(bytes, repo.show("HEAD", "chapters/one/intro.tex"));
    }

    #[test]
    fn path_missing_at_revision() {
        let repo = TestRepo::new();
        repo.commit_file("paper.tex", b"A\n", "Add paper");

        let err = repo
            .git()
            .materialize(Path::new("paper.tex"), &commit("HEAD~1"))
            .unwrap_err();

        assert!(matches!(err, GitError::PathNotTracked { .. }));
    }

    #[test]
    fn directory_is_not_a_document() {
        let repo = TestRepo::new();
        repo.commit_file("chapters/intro.tex", b"x\n", "intro");

        let err = repo
            .git()
            .materialize(Path::new("chapters"), &commit("HEAD"))
            .unwrap_err();

        assert!(matches!(err, GitError::PathNotTracked { .. }));
    }

    #[test]
    fn invalid_revision() {
        let repo = TestRepo::new();
        let err = repo
            .git()
            .materialize(Path::new("README.md"), &commit("nope"))
            .unwrap_err();
        assert!(matches!(err, GitError::RevisionNotFound { .. }));
    }

    #[test]
    fn working_copy_reads_checked_out_file() {
        let repo = TestRepo::new();
        repo.commit_file("paper.tex", b"A\n", "Add paper");
        fs::write(repo.path().join("paper.tex"), "A B\n").unwrap();

        let bytes = repo
            .git()
            .materialize(Path::new("paper.tex"), &Revision::WorkingCopy)
            .unwrap();

        assert_eq!(bytes, b"A B\n");
    }

    #[test]
    fn working_copy_requires_tracked_file() {
        let repo = TestRepo::new();
        fs::write(repo.path().join("scratch.tex"), "x").unwrap();

        let err = repo
            .git()
            .materialize(Path::new("scratch.tex"), &Revision::WorkingCopy)
            .unwrap_err();

        assert!(matches!(err, GitError::PathNotTracked { .. }));
    }

    #[test]
    fn working_copy_deleted_file() {
        let repo = TestRepo::new();
        repo.commit_file("paper.tex", b"A\n", "Add paper");
        fs::remove_file(repo.path().join("paper.tex")).unwrap();

        let err = repo
            .git()
            .materialize(Path::new("paper.tex"), &Revision::WorkingCopy)
            .unwrap_err();

        assert!(matches!(err, GitError::PathNotTracked { .. }));
    }

    #[test]
    fn does_not_touch_working_copy() {
        let repo = TestRepo::new();
        let oid = repo.commit_file("paper.tex", b"A\n", "Add paper");
        fs::write(repo.path().join("paper.tex"), "dirty\n").unwrap();

        repo.git()
            .materialize(Path::new("paper.tex"), &commit(&oid))
            .unwrap();

        assert_eq!(fs::read(repo.path().join("paper.tex")).unwrap(), b"dirty\n");
        let status = git_output(repo.path(), &["status", "--porcelain"]);
        assert_eq!(String::from_utf8(status).unwrap().trim(), "M paper.tex");
    }
}

mod relative_path {
    use super::*;

    #[test]
    fn relative_to_base() {
        let repo = TestRepo::new();
        repo.commit_file("chapters/intro.tex", b"x\n", "intro");
        let git = repo.git();

        let relative = git
            .relative_path(Path::new("intro.tex"), &repo.path().join("chapters"))
            .unwrap();

        assert_eq!(relative, PathBuf::from("chapters/intro.tex"));
    }

    #[test]
    fn absolute_input() {
        let repo = TestRepo::new();
        let git = repo.git();

        let relative = git
            .relative_path(&repo.path().join("README.md"), Path::new("/"))
            .unwrap();

        assert_eq!(relative, PathBuf::from("README.md"));
    }

    #[test]
    fn outside_repository() {
        let repo = TestRepo::new();
        let elsewhere = TempDir::new().unwrap();

        let err = repo
            .git()
            .relative_path(&elsewhere.path().join("paper.tex"), repo.path())
            .unwrap_err();

        assert!(matches!(err, GitError::PathOutsideRepo { .. }));
    }

    #[test]
    fn git_dir_rejected() {
        let repo = TestRepo::new();

        let err = repo
            .git()
            .relative_path(Path::new(".git/config"), repo.path())
            .unwrap_err();

        assert!(matches!(err, GitError::PathOutsideRepo { .. }));
    }
}
