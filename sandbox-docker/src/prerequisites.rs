use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use sandbox::{Result, SandboxError};

use crate::config::DockerConfig;

/// Verify host prerequisites before accepting jobs.
///
/// Collects all failures into a single `BackendNotAvailable` error:
/// runtime binary present and executable, limits internally consistent,
/// staging root creatable. Meant to run once at startup — a failure here
/// stops the subsystem from accepting jobs at all, instead of failing
/// job by job.
pub async fn check_prerequisites(config: &DockerConfig) -> Result<()> {
    let mut errors = Vec::new();

    check_runtime_binary(&config.docker_binary, &mut errors);
    if let Err(e) = config.limits.validate() {
        errors.push(e.to_string());
    }
    ensure_staging_dir(&config.staging_dir, &mut errors).await;

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SandboxError::BackendNotAvailable(errors.join("; ")))
    }
}

fn check_runtime_binary(binary: &Path, errors: &mut Vec<String>) {
    // A bare name goes through PATH; an explicit path is checked directly.
    if binary.components().count() == 1 {
        if which::which(binary).is_err() {
            errors.push(format!(
                "container runtime not found in PATH: {}",
                binary.display()
            ));
        }
    } else if !binary.exists() {
        errors.push(format!(
            "container runtime not found: {}",
            binary.display()
        ));
    } else if let Ok(meta) = binary.metadata()
        && meta.permissions().mode() & 0o111 == 0
    {
        errors.push(format!(
            "container runtime is not executable: {}",
            binary.display()
        ));
    }
}

async fn ensure_staging_dir(dir: &Path, errors: &mut Vec<String>) {
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        errors.push(format!("cannot create staging dir {}: {e}", dir.display()));
    }
}
