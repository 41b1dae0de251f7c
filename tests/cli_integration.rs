//! End-to-end tests for the `revdiff` binary.
//!
//! Each test builds a real repository and drives the binary with
//! `assert_cmd`. The differencing engine is a `sh -c 'diff ...'` stand-in
//! configured through `REVDIFF_CONFIG`, so latexdiff is not required. HOME
//! and the XDG variables point into the fixture so no user configuration
//! leaks in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A repository with `paper.tex` = "A\n" at tag `c1` and "A B\n" in the
/// working copy, plus isolated config and temp directories.
struct Fixture {
    repo: TempDir,
    home: TempDir,
    temp_root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fx = Self {
            repo: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
            temp_root: TempDir::new().unwrap(),
        };

        run_git(fx.repo(), &["init", "-q"]);
        run_git(fx.repo(), &["config", "user.email", "test@example.com"]);
        run_git(fx.repo(), &["config", "user.name", "Test User"]);
        fs::write(fx.repo().join("paper.tex"), "A\n").unwrap();
        run_git(fx.repo(), &["add", "paper.tex"]);
        run_git(fx.repo(), &["commit", "-q", "-m", "c1"]);
        run_git(fx.repo(), &["tag", "c1"]);
        fs::write(fx.repo().join("paper.tex"), "A B\n").unwrap();

        fx.write_engine(r#"["-c", "diff \"$1\" \"$2\"", "engine"]"#, "difference_codes = [1]");
        fx
    }

    fn repo(&self) -> &Path {
        self.repo.path()
    }

    fn config_path(&self) -> PathBuf {
        self.home.path().join("revdiff.toml")
    }

    /// Configure a `sh` engine with the given args and extra `[engine]` keys.
    fn write_engine(&self, args: &str, extra: &str) {
        self.write_config(&format!(
            "[engine]\nprogram = \"sh\"\nargs = {}\n{}\n",
            args, extra
        ));
    }

    /// Replace the global config, keeping the isolated temp dir.
    fn write_config(&self, body: &str) {
        let config = format!("temp_dir = '{}'\n\n{}", self.temp_root.path().display(), body);
        fs::write(self.config_path(), config).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("revdiff").unwrap();
        cmd.current_dir(self.repo())
            .env("HOME", self.home.path())
            .env("REVDIFF_CONFIG", self.config_path())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("REVDIFF_LOG");
        cmd
    }

    fn workspaces_left(&self) -> usize {
        fs::read_dir(self.temp_root.path()).unwrap().count()
    }

    fn derived_output(&self) -> PathBuf {
        self.repo().join("paper-diff.tex")
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
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
}

mod success {
    use super::*;

    #[test]
    fn writes_diff_next_to_document() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Wrote"));

        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert!(diff.contains("> A B"), "unexpected diff: {}", diff);
        assert!(diff.contains("< A"), "unexpected diff: {}", diff);
        assert_eq!(fx.workspaces_left(), 0);
    }

    #[test]
    fn leaves_repository_untouched() {
        let fx = Fixture::new();

        fx.cmd().args(["-t", "paper.tex", "-o", "c1"]).assert().success();

        assert_eq!(fs::read_to_string(fx.repo().join("paper.tex")).unwrap(), "A B\n");
    }

    #[test]
    fn explicit_output_path() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "-O", "review/changes.tex"])
            .assert()
            .success();

        let explicit = fx.repo().join("review/changes.tex");
        assert!(fs::read_to_string(explicit).unwrap().contains("> A B"));
        assert!(!fx.derived_output().exists());
    }

    #[test]
    fn stdout_output() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "--stdout", "--quiet"])
            .assert()
            .success()
            .stdout(predicate::str::contains("> A B"))
            .stderr(predicate::str::is_empty());

        assert!(!fx.derived_output().exists());
    }

    #[test]
    fn identical_revisions_have_no_markers() {
        let fx = Fixture::new();
        run_git(fx.repo(), &["commit", "-q", "-am", "c2"]);

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "HEAD", "-n", "WORKTREE"])
            .assert()
            .success();

        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert!(!diff.contains('<') && !diff.contains('>'), "{}", diff);
    }

    #[test]
    fn two_commits() {
        let fx = Fixture::new();
        run_git(fx.repo(), &["commit", "-q", "-am", "c2"]);
        fs::write(fx.repo().join("paper.tex"), "uncommitted\n").unwrap();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "-n", "HEAD"])
            .assert()
            .success();

        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert!(diff.contains("> A B"));
        assert!(!diff.contains("uncommitted"));
    }

    #[test]
    fn cwd_flag() {
        let fx = Fixture::new();
        let elsewhere = TempDir::new().unwrap();

        fx.cmd()
            .current_dir(elsewhere.path())
            .arg("--cwd")
            .arg(fx.repo())
            .args(["--file", "paper.tex", "--old", "c1"])
            .assert()
            .success();

        assert!(fx.derived_output().exists());
    }

    #[test]
    fn engine_args_from_command_line() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "--engine-arg=-c"])
            .arg("--engine-arg=echo custom \"$(basename \"$1\")\"")
            .arg("--engine-arg=engine")
            .assert()
            .success();

        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert_eq!(diff, "custom old-paper.tex\n");
    }

    #[test]
    fn private_repo_config_overrides_global() {
        let fx = Fixture::new();
        let private = fx.repo().join(".git/revdiff");
        fs::create_dir_all(&private).unwrap();
        fs::write(
            private.join("config.toml"),
            "[engine]\nargs = [\"-c\", \"echo from-repo\", \"engine\"]\n",
        )
        .unwrap();

        fx.cmd().args(["-t", "paper.tex", "-o", "c1"]).assert().success();

        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert_eq!(diff, "from-repo\n");
    }

    #[test]
    fn committed_repo_config_cannot_run_commands() {
        let fx = Fixture::new();
        fs::write(
            fx.repo().join(".revdiff.toml"),
            "[engine]\nprogram = \"sh\"\nargs = [\"-c\", \"touch \\\"$HOME/pwned\\\"\", \"x\"]\n",
        )
        .unwrap();
        run_git(fx.repo(), &["add", ".revdiff.toml"]);
        run_git(fx.repo(), &["commit", "-q", "-m", "shared config"]);

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1"])
            .assert()
            .success()
            .stderr(
                predicate::str::contains("ignoring engine.program")
                    .and(predicate::str::contains("ignoring engine.args")),
            );

        assert!(!fx.home.path().join("pwned").exists());
        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert!(diff.contains("> A B"), "unexpected diff: {}", diff);
    }
}

mod failure {
    use super::*;

    #[test]
    fn unknown_revision_exits_3() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "nope"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("error:").and(predicate::str::contains("nope")));

        assert!(!fx.derived_output().exists());
        assert_eq!(fx.workspaces_left(), 0);
    }

    #[test]
    fn untracked_document_exits_3() {
        let fx = Fixture::new();
        fs::write(fx.repo().join("notes.tex"), "x").unwrap();

        fx.cmd()
            .args(["-t", "notes.tex", "-o", "c1"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("not tracked"));
    }

    #[test]
    fn outside_repository_exits_3() {
        let fx = Fixture::new();
        let elsewhere = TempDir::new().unwrap();
        fs::write(elsewhere.path().join("paper.tex"), "A").unwrap();

        fx.cmd()
            .current_dir(elsewhere.path())
            .args(["-t", "paper.tex", "-o", "c1"])
            .assert()
            .code(3);
    }

    #[test]
    fn missing_engine_exits_4() {
        let fx = Fixture::new();
        fx.write_config("[engine]\nprogram = \"revdiff-no-such-engine\"\n");

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1"])
            .assert()
            .code(4)
            .stderr(predicate::str::contains("revdiff-no-such-engine"));

        assert!(!fx.derived_output().exists());
        assert_eq!(fx.workspaces_left(), 0);
    }

    #[test]
    fn engine_flag_overrides_config() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "--engine", "revdiff-no-such-engine"])
            .assert()
            .code(4);
    }

    #[test]
    fn engine_failure_exits_5() {
        let fx = Fixture::new();
        fx.write_engine(r#"["-c", "echo oops >&2; exit 3", "engine"]"#, "");

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1"])
            .assert()
            .code(5)
            .stderr(predicate::str::contains("oops").and(predicate::str::contains("exit code 3")));

        assert!(!fx.derived_output().exists());
        assert_eq!(fx.workspaces_left(), 0);
    }

    #[test]
    fn difference_code_not_allowed_by_default() {
        let fx = Fixture::new();
        // Plain `diff` exits 1 on differences, which latexdiff's policy rejects
        fx.write_engine(r#"["-c", "diff \"$1\" \"$2\"", "engine"]"#, "");

        fx.cmd().args(["-t", "paper.tex", "-o", "c1"]).assert().code(5);
    }

    #[test]
    fn engine_timeout_exits_5() {
        let fx = Fixture::new();
        fx.write_engine(r#"["-c", "sleep 10", "engine"]"#, "");

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "--timeout", "1"])
            .assert()
            .code(5)
            .stderr(predicate::str::contains("timed out"));

        assert_eq!(fx.workspaces_left(), 0);
    }

    #[test]
    fn unwritable_output_exits_6() {
        let fx = Fixture::new();
        fs::write(fx.repo().join("blocker"), "").unwrap();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "-O", "blocker/diff.tex"])
            .assert()
            .code(6);

        assert_eq!(fx.workspaces_left(), 0);
    }

    #[test]
    fn unusable_temp_dir_exits_7() {
        let fx = Fixture::new();
        let blocker = fx.home.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        fs::write(
            fx.config_path(),
            format!(
                "temp_dir = '{}'\n\n[engine]\nprogram = \"sh\"\nargs = [\"-c\", \"cat \\\"$2\\\"\", \"engine\"]\n",
                blocker.display()
            ),
        )
        .unwrap();

        fx.cmd().args(["-t", "paper.tex", "-o", "c1"]).assert().code(7);

        assert!(!fx.derived_output().exists());
    }

    #[test]
    fn output_same_as_input_exits_2() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1", "-O", "paper.tex"])
            .assert()
            .code(2);

        assert_eq!(fs::read_to_string(fx.repo().join("paper.tex")).unwrap(), "A B\n");
    }

    #[test]
    fn invalid_config_exits_2() {
        let fx = Fixture::new();
        fx.write_config("nonsense = 1\n");

        fx.cmd()
            .args(["-t", "paper.tex", "-o", "c1"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("configuration"));
    }

    #[test]
    fn missing_arguments_exit_2() {
        let fx = Fixture::new();
        fx.cmd().args(["-t", "paper.tex"]).assert().code(2);
        fx.cmd().assert().code(2);
    }
}

mod misc {
    use super::*;

    #[test]
    fn completions() {
        let fx = Fixture::new();

        fx.cmd()
            .args(["--completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("revdiff"));
    }

    #[test]
    fn help_lists_flags() {
        let fx = Fixture::new();

        fx.cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("--tex-file")
                    .and(predicate::str::contains("--old"))
                    .and(predicate::str::contains("--new")),
            );
    }
}

#[cfg(feature = "latexdiff_tests")]
mod latexdiff {
    use super::*;

    #[test]
    fn real_latexdiff_marks_insertion() {
        let fx = Fixture::new();
        fx.write_config("");
        let doc = |body: &str| {
            format!(
                "\\documentclass{{article}}\n\\begin{{document}}\n{}\n\\end{{document}}\n",
                body
            )
        };
        fs::write(fx.repo().join("paper.tex"), doc("Alpha.")).unwrap();
        run_git(fx.repo(), &["commit", "-q", "-am", "real"]);
        fs::write(fx.repo().join("paper.tex"), doc("Alpha. Beta.")).unwrap();

        fx.cmd().args(["-t", "paper.tex", "-o", "HEAD"]).assert().success();

        let diff = fs::read_to_string(fx.derived_output()).unwrap();
        assert!(diff.contains("\\DIFadd"), "{}", diff);
        assert!(diff.contains("Beta"));
    }
}
