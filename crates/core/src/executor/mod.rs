//! External command execution.
//!
//! The work performed for each job is an opaque external command: the
//! question is written to its stdin and its entire stdout is the answer.
//! [`Executor`] is the seam the lifecycle engine depends on;
//! [`CommandExecutor`] is the process-backed implementation.

use std::fmt;

pub mod command;
pub mod subprocess;

pub use command::CommandExecutor;

/// Runs the job's work for one input.
///
/// A call is a single attempt: implementations never retry.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Feed `input` to the work and return its raw (untrimmed) output.
    async fn run(&self, input: &str) -> Result<String, ExecutionError>;
}

/// Failure of a single execution attempt.
#[derive(Debug)]
pub enum ExecutionError {
    /// The process could not be started (missing binary, permissions).
    Spawn(std::io::Error),
    /// An I/O error occurred while talking to the running process.
    Io(std::io::Error),
    /// The process ran but exited unsuccessfully.
    Failed {
        /// Exit code, `-1` when terminated by a signal.
        exit_code: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to start command: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Failed { exit_code, stderr } if stderr.is_empty() => {
                write!(f, "command exited with status {exit_code}")
            }
            Self::Failed { exit_code, stderr } => {
                write!(f, "command exited with status {exit_code}: {stderr}")
            }
        }
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) | Self::Io(err) => Some(err),
            Self::Failed { .. } => None,
        }
    }
}
