use async_trait::async_trait;

use crate::types::ExecutionOutcome;

/// A backend capable of executing one untrusted submission.
///
/// `run` never fails: every internal error is folded into
/// [`ExecutionOutcome::Infra`] so callers always receive a value, not a
/// propagated fault.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Human-readable backend name (e.g. "docker").
    fn name(&self) -> &str;

    /// Compile and run `code` with `stdin` piped to it.
    async fn run(&self, code: &str, stdin: &str) -> ExecutionOutcome;
}
