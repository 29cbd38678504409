/// Source of per-job identifiers.
///
/// The job ID namespaces every filesystem path and container name a job
/// allocates, so concurrent jobs never collide. Injected as a trait so
/// tests can pin deterministic IDs and assert exact workspace and
/// container names.
pub trait JobIdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Default production source: a random UUIDv4 per job.
pub struct UuidSource;

impl JobIdSource for UuidSource {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
