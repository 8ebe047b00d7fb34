//! Process-backed [`Executor`].

use tokio::process::Command;

use super::subprocess::run_command;
use super::{ExecutionError, Executor};

/// Runs a fixed external command once per job.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
    working_directory: Option<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_directory: None,
        }
    }

    /// Run the command from `dir` instead of the server's working directory.
    pub fn with_working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait::async_trait]
impl Executor for CommandExecutor {
    async fn run(&self, input: &str) -> Result<String, ExecutionError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }

        let output = run_command(&mut cmd, input).await?;

        if !output.status.success() {
            return Err(ExecutionError::Failed {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
