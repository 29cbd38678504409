use std::time::Duration;

use crate::error::{Result, SandboxError};

/// Per-job resource ceilings and deadlines.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLimits {
    /// Memory ceiling for the sandboxed program, in MiB.
    pub memory_mb: u32,
    /// CPU share in fractions of one core (0.5 = half a core).
    pub cpus: f64,
    /// Inner deadline: bounds the compiled program's own run time,
    /// enforced inside the sandbox so it holds even if the host-side
    /// supervisor stalls.
    pub run_timeout: Duration,
    /// Outer deadline: bounds the whole job (runtime startup + compile +
    /// run), enforced by the host supervisor. Must exceed `run_timeout`.
    pub job_timeout: Duration,
    /// Hard cap on buffered bytes per output stream.
    pub max_output_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            memory_mb: 128,
            cpus: 0.5,
            run_timeout: Duration::from_secs(3),
            job_timeout: Duration::from_secs(15),
            max_output_bytes: 1024 * 1024,
        }
    }
}

impl ResourceLimits {
    /// Check ceilings are nonzero and deadlines are ordered.
    ///
    /// `job_timeout` must strictly exceed `run_timeout`: the gap is what
    /// absorbs image startup and compile time, and it lets the
    /// in-container timeout fire first under normal load.
    pub fn validate(&self) -> Result<()> {
        if self.memory_mb == 0 {
            return Err(SandboxError::InvalidConfig("memory_mb must be nonzero".into()));
        }
        if self.cpus <= 0.0 {
            return Err(SandboxError::InvalidConfig(format!(
                "cpus must be positive, got {}",
                self.cpus
            )));
        }
        if self.run_timeout.is_zero() {
            return Err(SandboxError::InvalidConfig("run_timeout must be nonzero".into()));
        }
        if self.job_timeout <= self.run_timeout {
            return Err(SandboxError::InvalidConfig(format!(
                "job_timeout ({:?}) must exceed run_timeout ({:?})",
                self.job_timeout, self.run_timeout
            )));
        }
        if self.max_output_bytes == 0 {
            return Err(SandboxError::InvalidConfig(
                "max_output_bytes must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ResourceLimits::default().validate().unwrap();
    }

    #[test]
    fn rejects_job_timeout_equal_to_run_timeout() {
        let limits = ResourceLimits {
            run_timeout: Duration::from_secs(5),
            job_timeout: Duration::from_secs(5),
            ..ResourceLimits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("must exceed"), "got: {err}");
    }

    #[test]
    fn rejects_job_timeout_below_run_timeout() {
        let limits = ResourceLimits {
            run_timeout: Duration::from_secs(10),
            job_timeout: Duration::from_secs(3),
            ..ResourceLimits::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn rejects_zero_memory() {
        let limits = ResourceLimits {
            memory_mb: 0,
            ..ResourceLimits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("memory_mb"), "got: {err}");
    }

    #[test]
    fn rejects_nonpositive_cpus() {
        let limits = ResourceLimits {
            cpus: 0.0,
            ..ResourceLimits::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn rejects_zero_output_cap() {
        let limits = ResourceLimits {
            max_output_bytes: 0,
            ..ResourceLimits::default()
        };
        assert!(limits.validate().is_err());
    }
}
