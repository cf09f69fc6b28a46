//! Subprocess execution with a timeout

use std::ffi::OsStr;
use std::fmt::Debug;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// How a subprocess ended
#[derive(Debug, Clone, PartialEq)]
pub enum CommandStatus {
    /// Exited with the given code (`None` when killed by a signal)
    Exited(Option<i32>),
    TimedOut,
    /// The process could not be started
    FailedToStart(String),
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == CommandStatus::Exited(Some(0))
    }

    /// stdout and stderr joined, trimmed
    pub fn combined_output(&self) -> String {
        let mut combined = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(stderr);
        }
        combined
    }

    /// Human readable reason for a failure, `None` on success
    pub fn failure_message(&self, timeout: Duration) -> Option<String> {
        match &self.status {
            CommandStatus::Exited(Some(0)) => None,
            CommandStatus::Exited(code) => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let detail = match self.stderr.trim() {
                    "" => self.stdout.trim(),
                    stderr => stderr,
                };
                if detail.is_empty() {
                    Some(format!("Exited with code {code}"))
                } else {
                    Some(format!("Exited with code {code}: {detail}"))
                }
            }
            CommandStatus::TimedOut => Some(format!("Timeout after {}s", timeout.as_secs())),
            CommandStatus::FailedToStart(reason) => Some(reason.clone()),
        }
    }
}

/// Run `argv` to completion, killing it once `timeout` elapses
///
/// Arguments are passed through as OS strings, so file names that are not
/// valid UTF-8 reach the program unchanged.
pub async fn run_command<S>(argv: &[S], timeout: Duration) -> CommandOutput
where
    S: AsRef<OsStr> + Debug,
{
    let start = Instant::now();
    let failed = |reason: String| CommandOutput {
        status: CommandStatus::FailedToStart(reason),
        stdout: String::new(),
        stderr: String::new(),
        duration: start.elapsed(),
    };

    let Some((program, args)) = argv.split_first() else {
        return failed("Hook has no command".to_string());
    };
    let program_name = program.as_ref().to_string_lossy().into_owned();

    let executable = match which::which(program) {
        Ok(path) => path,
        Err(_) => return failed(format!("Command not found: {program_name}")),
    };

    tracing::debug!("Running {:?} (timeout {}s)", argv, timeout.as_secs());

    let child = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => return failed(format!("Failed to start {program_name}: {e}")),
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => CommandOutput {
            status: CommandStatus::Exited(output.status.code()),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        },
        Ok(Err(e)) => failed(format!("Failed to wait for {program_name}: {e}")),
        Err(_) => {
            tracing::warn!("{} timed out after {}s", program_name, timeout.as_secs());
            CommandOutput {
                status: CommandStatus::TimedOut,
                stdout: String::new(),
                stderr: String::new(),
                duration: start.elapsed(),
            }
        }
    }
}
