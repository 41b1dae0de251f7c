//! diff::engine
//!
//! The external differencing engine, run as a subprocess.
//!
//! One invocation per run: `<program> <args...> <old> <new>`, stdin closed,
//! stdout and stderr captured. Both pipes are drained on helper threads so
//! an engine that writes a lot cannot block on a full pipe while we wait on
//! it.
//!
//! The timeout is one deadline covering both the child's exit and the end
//! of its output. On expiry the child is killed and reaped. A descendant
//! that still holds a pipe open is left behind along with its reader
//! thread; the run reports a timeout either way.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use super::policy::{DiffOutcome, ExitPolicy};
use super::traits::{DiffOutput, DiffTool, EngineError};

/// Default engine binary.
pub const LATEXDIFF_PROGRAM: &str = "latexdiff";

/// Default bound on one engine run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A differencing engine invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    program: String,
    args: Vec<String>,
    policy: ExitPolicy,
    timeout: Duration,
}

impl ExternalEngine {
    /// Engine running `program` with default policy and timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            policy: ExitPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `latexdiff` with its documented exit codes.
    pub fn latexdiff() -> Self {
        Self::new(LATEXDIFF_PROGRAM)
    }

    /// Extra arguments placed before the two input paths.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Replace the exit-code policy.
    pub fn with_policy(mut self, policy: ExitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The configured extra arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The configured exit policy.
    pub fn policy(&self) -> &ExitPolicy {
        &self.policy
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Find the binary this engine would run.
    ///
    /// A program containing a path separator is checked as given; a bare
    /// name is searched for on `PATH`.
    pub fn locate(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return is_executable(program).then(|| program.to_path_buf());
        }

        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .flat_map(|dir| candidates(&dir, &self.program))
            .find(|candidate| is_executable(candidate))
    }

    fn not_found(&self) -> EngineError {
        EngineError::NotFound {
            program: self.program.clone(),
        }
    }

    fn io_error(&self, source: io::Error) -> EngineError {
        EngineError::Io {
            program: self.program.clone(),
            source,
        }
    }

    fn timed_out(&self, waiting_for: &str) -> EngineError {
        tracing::warn!(
            program = %self.program,
            timeout = ?self.timeout,
            waiting_for,
            "engine timed out"
        );
        EngineError::TimedOut {
            program: self.program.clone(),
            timeout: self.timeout,
        }
    }

    /// Everything a reader captured, if its pipe closes before `deadline`.
    fn collect(
        &self,
        reader: Option<Receiver<io::Result<Vec<u8>>>>,
        deadline: Instant,
    ) -> Result<Vec<u8>, EngineError> {
        let Some(reader) = reader else {
            return Ok(Vec::new());
        };

        match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(captured) => captured.map_err(|e| self.io_error(e)),
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out("output")),
            Err(RecvTimeoutError::Disconnected) => Err(self.io_error(io::Error::new(
                io::ErrorKind::Other,
                "pipe reader panicked",
            ))),
        }
    }
}

impl Default for ExternalEngine {
    fn default() -> Self {
        Self::latexdiff()
    }
}

impl DiffTool for ExternalEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn check_available(&self) -> Result<(), EngineError> {
        match self.locate() {
            Some(path) => {
                tracing::debug!(program = %self.program, path = %path.display(), "located engine");
                Ok(())
            }
            None => Err(self.not_found()),
        }
    }

    fn compute_diff(&self, old: &Path, new: &Path) -> Result<DiffOutput, EngineError> {
        for input in [old, new] {
            if !input.is_file() {
                return Err(EngineError::MissingInput {
                    path: input.to_path_buf(),
                });
            }
        }

        tracing::debug!(
            program = %self.program,
            args = ?self.args,
            old = %old.display(),
            new = %new.display(),
            "running differencing engine"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(old)
            .arg(new)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => self.not_found(),
                _ => self.io_error(e),
            })?;

        let deadline = Instant::now() + self.timeout;
        let stdout_reader = child.stdout.take().map(drain);
        let stderr_reader = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out("exit"));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.io_error(e));
            }
        };

        let stdout = self.collect(stdout_reader, deadline)?;
        let stderr = self.collect(stderr_reader, deadline)?;
        let stderr = String::from_utf8_lossy(&stderr);

        let outcome = self.policy.classify(status.code(), &stderr);
        tracing::debug!(code = ?status.code(), outcome = ?outcome, bytes = stdout.len(), "engine finished");

        match outcome {
            DiffOutcome::Failure { code, stderr } => Err(EngineError::Failed {
                program: self.program.clone(),
                code,
                stderr,
            }),
            outcome => Ok(DiffOutput {
                content: stdout,
                outcome,
            }),
        }
    }
}

/// Read `stream` to its end on a helper thread; the result arrives on the
/// returned channel.
fn drain<R: Read + Send + 'static>(mut stream: R) -> Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let captured = stream.read_to_end(&mut buffer).map(|_| buffer);
        // The receiver is gone once the run has given up on this pipe
        let _ = tx.send(captured);
    });
    rx
}

#[cfg(windows)]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program), dir.join(format!("{}.exe", program))]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
