use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use sandbox::{ExitDisposition, RawResult, Result, SandboxError};
use tokio::process::{Child, Command};
use tracing::warn;

use crate::capture::{Captured, read_capped};

/// Launch the container runtime invocation and supervise it to
/// completion under the outer deadline.
///
/// Both output pipes are drained concurrently with the wait, never after
/// it, so a chatty program cannot deadlock on a full pipe buffer. When
/// the deadline fires the whole process group is killed and reaped; the
/// in-container timeout fires independently and surfaces later as exit
/// code 124.
pub(crate) async fn supervise(
    binary: &Path,
    args: &[String],
    job_timeout: Duration,
    max_output_bytes: usize,
) -> Result<RawResult> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|e| SandboxError::Spawn(format!("{}: {e}", binary.display())))?;

    let stdout = child.stdout.take();
    let stdout_task = tokio::spawn(async move {
        match stdout {
            Some(pipe) => read_capped(pipe, max_output_bytes).await,
            None => Captured::default(),
        }
    });
    let stderr = child.stderr.take();
    let stderr_task = tokio::spawn(async move {
        match stderr {
            Some(pipe) => read_capped(pipe, max_output_bytes).await,
            None => Captured::default(),
        }
    });

    let exit = match tokio::time::timeout(job_timeout, child.wait()).await {
        Ok(Ok(status)) => ExitDisposition::Exited(status.code().unwrap_or(-1)),
        Ok(Err(e)) => {
            kill_group(&child);
            let _ = child.wait().await;
            return Err(SandboxError::Spawn(format!("wait: {e}")));
        }
        Err(_) => {
            kill_group(&child);
            // Reap the zombie; the group kill also closes the pipes so
            // the capture tasks see EOF.
            let _ = child.wait().await;
            ExitDisposition::DeadlineExceeded
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(RawResult {
        stdout: stdout.data,
        stderr: stderr.data,
        stdout_truncated: stdout.truncated,
        stderr_truncated: stderr.truncated,
        exit,
    })
}

/// Kill the entire process group of `child` via `killpg(SIGKILL)`.
///
/// Requires the child to have been spawned with `process_group(0)` so
/// its PGID equals its PID. No-op if the child has already exited.
fn kill_group(child: &Child) {
    if let Some(pid) = child.id()
        && let Ok(pid) = i32::try_from(pid)
    {
        let pgid = nix::unistd::Pid::from_raw(pid);
        if let Err(e) = nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL) {
            warn!(pid, error = %e, "failed to kill process group");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Instant;

    use super::*;

    fn sh_args(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    const GENEROUS: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let raw = supervise(
            Path::new("/bin/sh"),
            &sh_args("echo hello"),
            GENEROUS,
            1024,
        )
        .await
        .unwrap();
        assert_eq!(raw.exit, ExitDisposition::Exited(0));
        assert_eq!(raw.stdout, b"hello\n");
        assert!(raw.stderr.is_empty());
    }

    #[tokio::test]
    async fn captures_stderr_on_failure() {
        let raw = supervise(
            Path::new("/bin/sh"),
            &sh_args("echo oops >&2; exit 3"),
            GENEROUS,
            1024,
        )
        .await
        .unwrap();
        assert_eq!(raw.exit, ExitDisposition::Exited(3));
        assert_eq!(raw.stderr, b"oops\n");
    }

    #[tokio::test]
    async fn deadline_kills_the_process_group() {
        let start = Instant::now();
        let raw = supervise(
            Path::new("/bin/sh"),
            &sh_args("sleep 30"),
            Duration::from_millis(200),
            1024,
        )
        .await
        .unwrap();
        assert_eq!(raw.exit, ExitDisposition::DeadlineExceeded);
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "supervisor waited for the full sleep"
        );
    }

    #[tokio::test]
    async fn output_before_deadline_is_preserved() {
        let raw = supervise(
            Path::new("/bin/sh"),
            &sh_args("echo early; sleep 30"),
            Duration::from_millis(300),
            1024,
        )
        .await
        .unwrap();
        assert_eq!(raw.exit, ExitDisposition::DeadlineExceeded);
        assert_eq!(raw.stdout, b"early\n");
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let missing = PathBuf::from("/nonexistent/runtime-binary");
        let err = supervise(&missing, &sh_args("true"), GENEROUS, 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Spawn(_)), "got: {err}");
    }

    #[tokio::test]
    async fn oversized_output_is_capped_without_hanging() {
        // Emits ~1 MiB; the 4 KiB cap must not stall the writer.
        let raw = supervise(
            Path::new("/bin/sh"),
            &sh_args("i=0; while [ $i -lt 16384 ]; do echo 0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef; i=$((i+1)); done"),
            GENEROUS,
            4096,
        )
        .await
        .unwrap();
        assert_eq!(raw.exit, ExitDisposition::Exited(0));
        assert_eq!(raw.stdout.len(), 4096);
        assert!(raw.stdout_truncated);
    }
}
