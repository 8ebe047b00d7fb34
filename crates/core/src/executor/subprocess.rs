//! Subprocess plumbing shared by command-backed executors.
//!
//! [`run_command`] spawns a prepared [`tokio::process::Command`], writes the
//! input to stdin while stdout and stderr are drained, and waits for exit.
//! Writing and reading happen concurrently so a child that produces output
//! before it finishes reading its input cannot deadlock on a full pipe.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};

use super::ExecutionError;

/// Everything captured from one finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `cmd`, pipe `input` to its stdin, and capture its output.
///
/// The caller sets program, arguments and working directory. There is no
/// timeout: the call lasts as long as the child does.
pub async fn run_command(cmd: &mut Command, input: &str) -> Result<CommandOutput, ExecutionError> {
    // `kill_on_drop` reaps the child if the awaiting task is dropped.
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(ExecutionError::Spawn)?;

    let stdin = child.stdin.take();
    let payload = input.as_bytes().to_vec();
    let writer = tokio::spawn(async move { write_stdin(stdin, payload).await });

    let output = child.wait_with_output().await.map_err(ExecutionError::Io)?;

    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(ExecutionError::Io(e)),
        Err(e) => return Err(ExecutionError::Io(io::Error::other(e))),
    }

    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Write the whole payload and close stdin.
///
/// A child that exits or closes stdin without reading is fine; the broken
/// pipe is not reported.
async fn write_stdin(stdin: Option<ChildStdin>, payload: Vec<u8>) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    let result = async {
        stdin.write_all(&payload).await?;
        stdin.shutdown().await
    }
    .await;

    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
