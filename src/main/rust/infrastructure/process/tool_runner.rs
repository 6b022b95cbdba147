use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::domain::errors::{DomainError, Result};

/// Captured result of one tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Turn a non-zero exit into `ToolReportedFailure`
    pub fn into_checked(self) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let detail = self.failure_detail();
        Err(DomainError::ToolReportedFailure {
            command: self.command,
            detail,
        })
    }

    /// Most useful line to report for a failed invocation
    pub fn failure_detail(&self) -> String {
        let pick = |text: &str| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .last()
                .map(str::to_string)
        };
        pick(&self.stderr)
            .or_else(|| pick(&self.stdout))
            .unwrap_or_else(|| "exited with non-zero status".to_string())
    }
}

/// Runs external tools with a hard deadline. Children are killed when the deadline passes.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: String,
}

impl ToolRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn describe(&self, args: &[&str]) -> String {
        if args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, args.join(" "))
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Run to completion. Exit status is reported, not checked.
    pub async fn run(&self, args: &[&str], timeout: Duration) -> Result<ToolOutput> {
        let description = self.describe(args);
        tracing::debug!(command = %description, ?timeout, "Running tool");

        let output = match tokio::time::timeout(timeout, self.command(args).output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(DomainError::ToolReportedFailure {
                    command: description,
                    detail: format!("failed to start: {}", e),
                })
            }
            Err(_) => {
                tracing::warn!(command = %description, ?timeout, "Tool timed out");
                return Err(DomainError::ToolTimeout {
                    command: description,
                    timeout,
                });
            }
        };

        let result = ToolOutput {
            command: description,
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            command = %result.command,
            success = result.success,
            stdout = %result.stdout.trim(),
            "Tool finished"
        );
        Ok(result)
    }

    /// Run and require a zero exit status
    pub async fn run_checked(&self, args: &[&str], timeout: Duration) -> Result<ToolOutput> {
        self.run(args, timeout).await?.into_checked()
    }

    /// Start a long-running invocation without waiting for it
    pub fn spawn(&self, args: &[&str]) -> Result<Child> {
        let description = self.describe(args);
        tracing::debug!(command = %description, "Spawning tool");

        let mut command = self.command(args);
        command.stdout(Stdio::null()).stderr(Stdio::null());
        command
            .spawn()
            .map_err(|e| DomainError::ToolReportedFailure {
                command: description,
                detail: format!("failed to start: {}", e),
            })
    }
}
