use std::sync::Arc;

use async_trait::async_trait;
use sandbox::{ExecutionOutcome, JobIdSource, RawResult, Result, Sandbox, UuidSource};
use tracing::{info, warn};

use crate::cleanup;
use crate::command;
use crate::config::DockerConfig;
use crate::container;
use crate::workspace::JobWorkspace;

/// Docker-backed sandbox: one ephemeral container per job, a
/// compile-then-run pipeline inside it, and teardown guaranteed on
/// every exit path.
pub struct DockerSandbox {
    config: DockerConfig,
    ids: Arc<dyn JobIdSource>,
}

impl DockerSandbox {
    pub fn new(config: DockerConfig) -> Self {
        Self::with_id_source(config, Arc::new(UuidSource))
    }

    /// Use a caller-supplied ID source (deterministic IDs in tests).
    pub fn with_id_source(config: DockerConfig, ids: Arc<dyn JobIdSource>) -> Self {
        Self { config, ids }
    }

    async fn execute(&self, container: &str, workspace: &JobWorkspace) -> Result<RawResult> {
        let args = command::run_args(&self.config, container, workspace);
        container::supervise(
            &self.config.docker_binary,
            &args,
            self.config.limits.job_timeout,
            self.config.limits.max_output_bytes,
        )
        .await
    }
}

#[async_trait]
impl Sandbox for DockerSandbox {
    fn name(&self) -> &str {
        "docker"
    }

    async fn run(&self, code: &str, stdin: &str) -> ExecutionOutcome {
        let job_id = self.ids.next_id();
        let container = command::container_name(&job_id);
        info!(id = %job_id, "job started");

        let result =
            match JobWorkspace::stage(&self.config.staging_dir, &job_id, code, stdin).await {
                Ok(workspace) => {
                    let result = self.execute(&container, &workspace).await;
                    cleanup::teardown(&self.config.docker_binary, &container, &workspace).await;
                    result
                }
                Err(e) => {
                    // A partial staging failure can still leave files to
                    // collect, and the container name must be reclaimed.
                    let workspace = JobWorkspace::paths(&self.config.staging_dir, &job_id);
                    cleanup::teardown(&self.config.docker_binary, &container, &workspace).await;
                    Err(e)
                }
            };

        match result {
            Ok(raw) => {
                if raw.stdout_truncated || raw.stderr_truncated {
                    warn!(id = %job_id, "output truncated at byte ceiling");
                }
                let outcome = raw.into_outcome();
                info!(id = %job_id, outcome = outcome.label(), "job finished");
                outcome
            }
            Err(e) => {
                warn!(id = %job_id, error = %e, "job failed before a verdict");
                ExecutionOutcome::Infra {
                    message: e.to_string(),
                }
            }
        }
    }
}
