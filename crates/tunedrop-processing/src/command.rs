//! Bounded execution of external media tools.

use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

/// Number of stderr lines kept for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to execute {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} did not finish within {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },
}

/// Captured result of a finished invocation.
#[derive(Debug)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Last lines of stderr, lossily decoded.
    pub fn stderr_tail(&self) -> String {
        stderr_tail(&self.stderr, STDERR_TAIL_LINES)
    }
}

/// Runs one external program with a hard time limit.
///
/// The child is spawned with `kill_on_drop`, so when the limit expires the
/// pending wait is dropped and the process is killed.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: String,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the program to completion. stdout is only kept when
    /// `capture_stdout` is set; stderr is always captured.
    pub async fn run(&self, args: &[String], capture_stdout: bool) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(if capture_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                tool: self.program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ToolError::Spawn {
                tool: self.program.clone(),
                source,
            })?,
            Err(_) => {
                tracing::warn!(
                    tool = %self.program,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "External tool timed out and was killed"
                );
                return Err(ToolError::TimedOut {
                    tool: self.program.clone(),
                    timeout: self.timeout,
                });
            }
        };

        tracing::debug!(
            tool = %self.program,
            exit_code = ?output.status.code(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "External tool finished"
        );

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
