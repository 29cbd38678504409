use serde::Serialize;

/// Exit code the in-container `timeout` utility reports on expiry,
/// per Unix convention.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// The single result of one job. Exactly one variant is produced per
/// job; never output and an error simultaneously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The program compiled and exited 0. Empty stdout is valid.
    Success { stdout: String },
    /// Compile failure or runtime crash: a non-zero, non-timeout exit.
    /// Carries captured stderr, or a generic exit-code message when
    /// stderr was empty. OOM kills by the sandbox's own enforcement
    /// land here like any other non-zero exit.
    ProgramError { message: String },
    /// Either deadline fired: the in-container timeout or the host-side
    /// supervisor.
    TimedOut,
    /// The host failed before the sandbox could produce a verdict
    /// (staging IO failure, runtime spawn failure).
    Infra { message: String },
}

impl ExecutionOutcome {
    /// Short label for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::ProgramError { .. } => "program-error",
            Self::TimedOut => "timed-out",
            Self::Infra { .. } => "infra-error",
        }
    }
}

/// How the supervising process concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    /// Normal termination with the given exit code.
    Exited(i32),
    /// The host-side deadline fired and the process group was killed.
    DeadlineExceeded,
}

/// Raw result of one supervised container invocation.
#[derive(Debug)]
pub struct RawResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Whether the corresponding stream hit the byte ceiling.
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    pub exit: ExitDisposition,
}

impl RawResult {
    /// Collapse a raw invocation result into the per-job outcome.
    ///
    /// Exit 0 is success even with empty output. Exit 124 means the
    /// in-container timeout fired and maps to the same outcome as a
    /// host-side deadline kill. Everything else is a program error.
    pub fn into_outcome(self) -> ExecutionOutcome {
        match self.exit {
            ExitDisposition::DeadlineExceeded | ExitDisposition::Exited(TIMEOUT_EXIT_CODE) => {
                ExecutionOutcome::TimedOut
            }
            ExitDisposition::Exited(0) => ExecutionOutcome::Success {
                stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            },
            ExitDisposition::Exited(code) => {
                let stderr = String::from_utf8_lossy(&self.stderr).into_owned();
                let message = if stderr.is_empty() {
                    format!("process exited with code {code}")
                } else {
                    stderr
                };
                ExecutionOutcome::ProgramError { message }
            }
        }
    }
}

/// Caller-facing rendering of an outcome.
///
/// Compile errors, runtime crashes, timeouts, and infrastructure
/// failures all collapse to `status: "error"`; the message is what
/// distinguishes them for a human reader.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobResponse {
    Ok { output: String },
    Error { message: String },
}

impl From<&ExecutionOutcome> for JobResponse {
    fn from(outcome: &ExecutionOutcome) -> Self {
        match outcome {
            ExecutionOutcome::Success { stdout } if stdout.is_empty() => Self::Ok {
                output: "No output".to_string(),
            },
            ExecutionOutcome::Success { stdout } => Self::Ok {
                output: stdout.clone(),
            },
            ExecutionOutcome::ProgramError { message } => Self::Error {
                message: message.clone(),
            },
            ExecutionOutcome::TimedOut => Self::Error {
                message: "Execution timed out".to_string(),
            },
            ExecutionOutcome::Infra { message } => Self::Error {
                message: format!("Execution failed: {message}"),
            },
        }
    }
}
