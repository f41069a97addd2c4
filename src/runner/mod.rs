// Local command execution for test runs and deployment steps
//
// Timeouts are reported in the outcome, never as errors. Only failing to
// start a process is an error.

use crate::parsers::TestCounts;
use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Characters of stdout/stderr echoed to the log per step
const LOG_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("'{0}' was not found on PATH")]
    NotFound(String),

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of one shell command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub description: String,
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// Result of running a generated test file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// stdout followed by stderr
    pub output: String,
    pub stdout: String,
    pub exit_code: i32,
    pub timed_out: bool,
}

impl TestReport {
    fn timed_out(timeout_secs: u64) -> Self {
        let output = format!("Tests timed out after {} seconds", timeout_secs);
        Self {
            stdout: output.clone(),
            output,
            exit_code: 1,
            timed_out: true,
        }
    }

    /// Marker counts; a timed-out run counts as a single error
    pub fn counts(&self) -> TestCounts {
        if self.timed_out {
            TestCounts::timed_out()
        } else {
            TestCounts::from_output(&self.output)
        }
    }
}

/// Run `command` through `sh -c`, killing it after `timeout_secs`
pub async fn run_command(
    description: &str,
    command: &str,
    timeout_secs: u64,
    cwd: Option<&Path>,
) -> Result<CommandOutcome, RunnerError> {
    log::info!("{}...", description);

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let Some(output) = output_with_timeout(cmd, command, timeout_secs).await? else {
        log::warn!("{} timed out after {}s", description, timeout_secs);
        return Ok(CommandOutcome {
            description: description.to_string(),
            success: false,
            exit_code: 1,
            stdout: String::new(),
            stderr: format!("Timed out after {} seconds", timeout_secs),
            timed_out: true,
        });
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    if success {
        log::info!("{} - Success", description);
        if !stdout.trim().is_empty() {
            log::debug!("   Output: {}", truncate_chars(&stdout, LOG_EXCERPT_CHARS));
        }
    } else {
        log::warn!("{} - Failed", description);
        if !stderr.trim().is_empty() {
            log::warn!("   Error: {}", truncate_chars(&stderr, LOG_EXCERPT_CHARS));
        }
    }

    Ok(CommandOutcome {
        description: description.to_string(),
        success,
        exit_code: output.status.code().unwrap_or(1),
        stdout,
        stderr,
        timed_out: false,
    })
}

/// Run `<test_command> <test_file> -v --tb=short`
///
/// `test_command` may carry its own arguments (`python -m pytest`); its
/// program is looked up on PATH first.
pub async fn run_tests(
    test_command: &str,
    test_file: &Path,
    timeout_secs: u64,
    cwd: Option<&Path>,
) -> Result<TestReport, RunnerError> {
    let mut parts = test_command.split_whitespace();
    let program = parts.next().ok_or(RunnerError::EmptyCommand)?;
    let program_path = resolve_program(program)?;

    let mut cmd = Command::new(&program_path);
    cmd.args(parts).arg(test_file).args(["-v", "--tb=short"]);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    log::info!("Running {} {}", test_command, test_file.display());
    let Some(output) = output_with_timeout(cmd, test_command, timeout_secs).await? else {
        log::warn!("Tests timed out after {}s", timeout_secs);
        return Ok(TestReport::timed_out(timeout_secs));
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);

    Ok(TestReport {
        output: format!("{}{}", stdout, stderr),
        stdout,
        exit_code: output.status.code().unwrap_or(1),
        timed_out: false,
    })
}

fn resolve_program(program: &str) -> Result<PathBuf, RunnerError> {
    which::which(program).map_err(|_| RunnerError::NotFound(program.to_string()))
}

/// `None` when the process outlived the timeout; it is killed on drop
async fn output_with_timeout(
    mut cmd: Command,
    label: &str,
    timeout_secs: u64,
) -> Result<Option<std::process::Output>, RunnerError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
        Ok(result) => result.map(Some).map_err(|source| RunnerError::Spawn {
            command: label.to_string(),
            source,
        }),
        Err(_) => Ok(None),
    }
}
