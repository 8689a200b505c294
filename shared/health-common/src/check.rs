use async_trait::async_trait;

use crate::alert::Alert;
use crate::context::CheckContext;

/// A unit of verification logic run by the engine
///
/// `execute` returns `Ok(None)` on pass and `Ok(Some(alert))` on failure.
/// Connectivity problems should be turned into an alert by the check itself;
/// an `Err` is reserved for unexpected faults and is not caught by the engine.
/// The same instance may be executed by many runs.
#[async_trait]
pub trait Check: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &mut CheckContext) -> anyhow::Result<Option<Alert>>;
}
