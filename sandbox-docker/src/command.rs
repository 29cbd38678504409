use sandbox::ResourceLimits;

use crate::config::DockerConfig;
use crate::workspace::JobWorkspace;

/// Source path inside the container (read-only bind mount).
const GUEST_SOURCE: &str = "/workspace/code.cpp";
/// Input path inside the container (read-only bind mount).
const GUEST_INPUT: &str = "/workspace/input.txt";

/// Container name for a job. Derived from the job ID so concurrent jobs
/// sharing one runtime never collide.
pub(crate) fn container_name(job_id: &str) -> String {
    format!("cpp-runner-{job_id}")
}

/// Shell pipeline run inside the container: copy the read-only mounts
/// into a writable directory, compile, then run under the inner timeout
/// with the staged input on stdin.
fn compile_and_run_script(limits: &ResourceLimits) -> String {
    format!(
        "cp {GUEST_SOURCE} /tmp/code.cpp && cp {GUEST_INPUT} /tmp/input.txt && \
         cd /tmp && g++ -O2 -std=c++17 -w code.cpp -o program && \
         timeout {inner}s ./program < input.txt",
        inner = limits.run_timeout.as_secs(),
    )
}

/// Build the full `run` argument vector, one discrete token per element.
/// Tokens are handed to the process-spawn primitive directly and never
/// joined into a host-side shell string.
pub(crate) fn run_args(
    config: &DockerConfig,
    container: &str,
    workspace: &JobWorkspace,
) -> Vec<String> {
    vec![
        "run".into(),
        "--name".into(),
        container.into(),
        "--rm".into(),
        "--network".into(),
        "none".into(),
        "--memory".into(),
        format!("{}m", config.limits.memory_mb),
        "--cpus".into(),
        config.limits.cpus.to_string(),
        "--security-opt".into(),
        "no-new-privileges".into(),
        "-v".into(),
        format!("{}:{GUEST_SOURCE}:ro", workspace.source().display()),
        "-v".into(),
        format!("{}:{GUEST_INPUT}:ro", workspace.input().display()),
        config.image.clone(),
        "sh".into(),
        "-c".into(),
        compile_and_run_script(&config.limits),
    ]
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::*;
    use crate::config::DEFAULT_IMAGE;

    fn test_config() -> DockerConfig {
        DockerConfig::new(PathBuf::from("/stage"))
    }

    #[test]
    fn container_name_embeds_job_id() {
        assert_eq!(container_name("job1"), "cpp-runner-job1");
    }

    #[test]
    fn run_args_are_discrete_tokens() {
        let config = test_config();
        let workspace = JobWorkspace::paths(Path::new("/stage"), "job1");
        let args = run_args(&config, "cpp-runner-job1", &workspace);

        let expected_prefix = [
            "run",
            "--name",
            "cpp-runner-job1",
            "--rm",
            "--network",
            "none",
            "--memory",
            "128m",
            "--cpus",
            "0.5",
            "--security-opt",
            "no-new-privileges",
            "-v",
            "/stage/job1.cpp:/workspace/code.cpp:ro",
            "-v",
            "/stage/job1.input:/workspace/input.txt:ro",
            DEFAULT_IMAGE,
            "sh",
            "-c",
        ];
        assert_eq!(args.len(), expected_prefix.len() + 1);
        for (actual, expected) in args.iter().zip(expected_prefix) {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn script_compiles_then_runs_under_inner_timeout() {
        let config = test_config();
        let workspace = JobWorkspace::paths(Path::new("/stage"), "job1");
        let args = run_args(&config, "cpp-runner-job1", &workspace);
        let script = args.last().unwrap();

        assert!(script.contains("g++ -O2 -std=c++17 -w"), "got: {script}");
        assert!(script.contains("timeout 3s ./program"), "got: {script}");
        assert!(script.contains("< input.txt"), "got: {script}");
        let compile = script.find("g++").unwrap();
        let run = script.find("timeout").unwrap();
        assert!(compile < run);
    }

    #[test]
    fn script_honors_configured_inner_timeout() {
        let mut config = test_config();
        config.limits.run_timeout = Duration::from_secs(7);
        config.limits.job_timeout = Duration::from_secs(30);
        let workspace = JobWorkspace::paths(Path::new("/stage"), "job1");
        let args = run_args(&config, "cpp-runner-job1", &workspace);
        assert!(args.last().unwrap().contains("timeout 7s"));
    }

    #[test]
    fn memory_and_cpu_flags_follow_limits() {
        let mut config = test_config();
        config.limits.memory_mb = 256;
        config.limits.cpus = 1.5;
        let workspace = JobWorkspace::paths(Path::new("/stage"), "job1");
        let args = run_args(&config, "cpp-runner-job1", &workspace);

        assert!(args.iter().any(|a| a == "256m"));
        assert!(args.iter().any(|a| a == "1.5"));
    }
}
