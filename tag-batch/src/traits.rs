use crate::types::AttemptOutcome;
use async_trait::async_trait;

/// Anything that can look up the classification of one identifier.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Human-readable name for this source, used in logs
    fn source_name(&self) -> String;

    /// Performs a single lookup attempt. Never retries on its own.
    async fn lookup(&self, id: &str) -> AttemptOutcome;
}
