use std::path::{Path, PathBuf};

use sandbox::{Result, SandboxError};
use tracing::warn;

/// Staged on-disk inputs for one job.
///
/// Both paths are derived from the job ID, so concurrent jobs sharing
/// the staging directory never overwrite each other.
#[derive(Debug)]
pub(crate) struct JobWorkspace {
    source: PathBuf,
    input: PathBuf,
}

impl JobWorkspace {
    /// Compute the per-job paths without touching the filesystem.
    pub(crate) fn paths(staging_dir: &Path, job_id: &str) -> Self {
        Self {
            source: staging_dir.join(format!("{job_id}.cpp")),
            input: staging_dir.join(format!("{job_id}.input")),
        }
    }

    /// Materialize the submission on disk.
    ///
    /// Creating the staging directory is idempotent and safe under
    /// concurrent jobs sharing the same parent. Any write failure is
    /// fatal for the job.
    pub(crate) async fn stage(
        staging_dir: &Path,
        job_id: &str,
        code: &str,
        input: &str,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(staging_dir)
            .await
            .map_err(|e| {
                SandboxError::Staging(format!("create {}: {e}", staging_dir.display()))
            })?;

        let workspace = Self::paths(staging_dir, job_id);
        tokio::fs::write(&workspace.source, code)
            .await
            .map_err(|e| {
                SandboxError::Staging(format!("write {}: {e}", workspace.source.display()))
            })?;
        tokio::fs::write(&workspace.input, input)
            .await
            .map_err(|e| {
                SandboxError::Staging(format!("write {}: {e}", workspace.input.display()))
            })?;
        Ok(workspace)
    }

    pub(crate) fn source(&self) -> &Path {
        &self.source
    }

    pub(crate) fn input(&self) -> &Path {
        &self.input
    }

    /// Delete both staged files.
    ///
    /// Already-gone files are the normal case after a partial staging
    /// failure; anything else is logged and swallowed.
    pub(crate) async fn teardown(&self) {
        for path in [&self.source, &self.input] {
            if let Err(e) = tokio::fs::remove_file(path).await
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %path.display(), error = %e, "failed to delete staged file");
            }
        }
    }
}
