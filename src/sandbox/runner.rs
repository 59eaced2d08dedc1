use async_trait::async_trait;

use crate::error::Result;

use super::ExecutionOutput;

/// Trait for anything that can execute a unit of submitted source
///
/// The judge only needs the raw stdout and exit status; it never interprets
/// the exit status. Implementations must report transport problems as
/// `JudgeError::SandboxUnavailable` instead of an empty output.
#[async_trait]
pub trait SandboxRunner: Send + Sync {
    /// Executes `source` once and returns its output unchanged
    async fn run(&self, source: &str) -> Result<ExecutionOutput>;
}
