use std::path::{Path, PathBuf};
use std::time::Duration;

use sandbox::ResourceLimits;
use sandbox_docker::{DEFAULT_IMAGE, DockerConfig};
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

pub(crate) const DEFAULT_MEMORY_MB: u32 = 128;
pub(crate) const DEFAULT_CPUS: f64 = 0.5;
pub(crate) const DEFAULT_RUN_TIMEOUT_SECS: u64 = 3;
pub(crate) const DEFAULT_JOB_TIMEOUT_SECS: u64 = 15;
pub(crate) const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub staging_dir: PathBuf,
    #[serde(default)]
    pub docker: DockerSection,
    #[serde(default)]
    pub limits: LimitsSection,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSection {
    pub binary: PathBuf,
    pub image: String,
}

impl Default for DockerSection {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("docker"),
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub memory_mb: u32,
    pub cpus: f64,
    pub run_timeout_secs: u64,
    pub job_timeout_secs: u64,
    pub max_output_bytes: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            memory_mb: DEFAULT_MEMORY_MB,
            cpus: DEFAULT_CPUS,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            job_timeout_secs: DEFAULT_JOB_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Load and validate a runner config from a YAML file.
///
/// Relative paths are resolved against the config file's parent
/// directory. Deadline ordering (`job_timeout > run_timeout`) and limit
/// sanity are rejected here, at load time, not discovered per job.
pub async fn load(path: &Path) -> RunnerResult<RunnerConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunnerError::Config(format!("read {}: {e}", path.display())))?;
    let mut config: RunnerConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| RunnerError::Config(format!("parse {}: {e}", path.display())))?;
    if let Some(config_dir) = path.parent() {
        config.resolve_relative_paths(config_dir);
    }
    config
        .docker_config()
        .limits
        .validate()
        .map_err(|e| RunnerError::Config(e.to_string()))?;
    Ok(config)
}

impl RunnerConfig {
    /// Resolve relative paths against `config_dir` (the directory
    /// containing the YAML file). A bare binary name stays bare so PATH
    /// lookup still applies.
    fn resolve_relative_paths(&mut self, config_dir: &Path) {
        if self.staging_dir.is_relative() {
            self.staging_dir = config_dir.join(&self.staging_dir);
        }
        if self.docker.binary.is_relative() && self.docker.binary.components().count() > 1 {
            self.docker.binary = config_dir.join(&self.docker.binary);
        }
    }

    /// Build the backend config from this file config.
    pub fn docker_config(&self) -> DockerConfig {
        DockerConfig {
            docker_binary: self.docker.binary.clone(),
            image: self.docker.image.clone(),
            staging_dir: self.staging_dir.clone(),
            limits: ResourceLimits {
                memory_mb: self.limits.memory_mb,
                cpus: self.limits.cpus,
                run_timeout: Duration::from_secs(self.limits.run_timeout_secs),
                job_timeout: Duration::from_secs(self.limits.job_timeout_secs),
                max_output_bytes: self.limits.max_output_bytes,
            },
        }
    }
}
