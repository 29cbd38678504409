use std::path::Path;

use tokio::process::Command;
use tracing::{trace, warn};

use crate::workspace::JobWorkspace;

/// Force-remove the named container.
///
/// Covers the case where the runtime's own remove-on-exit never fired
/// because the supervising process was killed by the outer deadline.
/// "No such container" is the common case here and only traced.
async fn remove_container(binary: &Path, name: &str) {
    match Command::new(binary).args(["rm", "-f", name]).output().await {
        Ok(output) if !output.status.success() => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            trace!(container = %name, stderr = %stderr.trim(), "container remove skipped");
        }
        Err(e) => {
            warn!(container = %name, error = %e, "failed to invoke container remove");
        }
        _ => {
            trace!(container = %name, "container removed");
        }
    }
}

/// Tear down everything a job allocated: the named container, then the
/// staged files. Each step is independently best-effort; a failure in
/// one never blocks the others, and none is reported to the caller.
pub(crate) async fn teardown(binary: &Path, container: &str, workspace: &JobWorkspace) {
    remove_container(binary, container).await;
    workspace.teardown().await;
}
