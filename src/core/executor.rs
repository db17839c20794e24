//! Remote command execution boundary
//!
//! The multiplexer never runs non-builtin commands itself: they are handed
//! to an [`Executor`], which owns process isolation, timeouts, and resource
//! limits. The driver calls executors from short-lived worker threads and
//! feeds results back into the event loop over a channel, so a slow command
//! never blocks editing or other sessions.

use std::io;
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

use crate::core::session::SessionId;

/// Errors surfaced by an executor
#[derive(Error, Debug)]
pub enum ExecError {
    /// The remote side rejected the command
    #[error("{0}")]
    Remote(String),

    /// The command could not be started at all
    #[error("failed to spawn command: {0}")]
    Spawn(#[source] io::Error),
}

/// Where a command runs: the owning session and its working directory
#[derive(Clone, Debug)]
pub struct ExecTarget {
    pub session: SessionId,
    pub working_dir: String,
}

/// A command executor.
///
/// `execute` blocks until the command finishes and returns the combined
/// output text. Implementations must be callable from worker threads.
pub trait Executor: Send + Sync {
    fn execute(&self, target: &ExecTarget, command: &str) -> Result<String, ExecError>;
}

/// Completed dispatch, delivered back to the event loop
#[derive(Debug)]
pub struct DispatchOutcome {
    pub session: SessionId,
    pub command: String,
    pub result: Result<String, ExecError>,
    pub elapsed: Duration,
}

/// Executor that runs commands through the local system shell.
///
/// The session's working directory is honored when it exists on this
/// machine; it is otherwise treated as a label only, matching the builtin
/// `cd` which performs no validation. stdout and stderr are combined in
/// that order. A non-zero exit status is still a successful execution;
/// the output classifier colors any error text it produced.
pub struct ProcessExecutor {
    shell: String,
}

impl ProcessExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(default_shell())
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, target: &ExecTarget, command: &str) -> Result<String, ExecError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(shell_flag(&self.shell)).arg(command);
        if std::path::Path::new(&target.working_dir).is_dir() {
            cmd.current_dir(&target.working_dir);
        }

        let output = cmd.output().map_err(ExecError::Spawn)?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }
        Ok(combined)
    }
}

fn default_shell() -> String {
    if cfg!(windows) {
        "cmd.exe".to_string()
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

fn shell_flag(shell: &str) -> &'static str {
    if shell.contains("cmd") {
        "/C"
    } else {
        "-c"
    }
}
