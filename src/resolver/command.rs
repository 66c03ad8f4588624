//! Bounded execution of the external resolver process.
//!
//! One [`ToolCommand`] is one invocation: stdout and stderr are captured in
//! full, and a wall-clock deadline is enforced. The child is spawned with
//! `kill_on_drop`, so hitting the deadline terminates the process instead of
//! leaking it.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Captured output of a finished resolver invocation.
///
/// A nonzero exit status is not an error at this layer; classification is
/// left to the caller, which also owns the decision of what to log.
#[derive(Debug)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// Builder for one bounded invocation of an external tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, s: impl Into<String>) -> Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Name of the program, for error messages and logging.
    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::ResolveFailed`] if the process cannot be spawned.
    /// - [`Error::ResolveTimeout`] if the deadline passes; the child is
    ///   killed before this returns.
    pub async fn execute(self) -> Result<ToolOutput> {
        let name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            tracing::error!(tool = %name, error = %e, "failed to spawn resolver process");
            Error::ResolveFailed { tool: name.clone() }
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ToolOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Ok(Err(e)) => Err(Error::Internal(format!(
                "I/O error waiting for {name}: {e}"
            ))),
            // Deadline hit: the in-flight future owns the child, and dropping
            // it triggers kill_on_drop, so the process does not outlive us.
            Err(_elapsed) => Err(Error::ResolveTimeout {
                tool: name,
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}
