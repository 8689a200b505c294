use async_trait::async_trait;
use health_common::{alert_names, context_keys, Alert, Check, CheckContext};
use std::sync::Arc;
use std::time::Duration;

use crate::source::{record_block_number, BlockHeightSource, ExplorerSource, SourceError};

/// Reads the reference chain height into `refBlockNumber`
///
/// Raises `refConnectionError` with the cause in `err` when the reference
/// source cannot be queried.
pub struct ReferenceNodeCheck {
    source: Arc<dyn BlockHeightSource>,
}

impl ReferenceNodeCheck {
    pub fn new(source: Arc<dyn BlockHeightSource>) -> Self {
        Self { source }
    }

    /// Check against an explorer proxy endpoint at `url`
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self::new(Arc::new(ExplorerSource::new(url, timeout)?)))
    }
}

#[async_trait]
impl Check for ReferenceNodeCheck {
    fn name(&self) -> &str {
        "ReferenceNodeCheck"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> anyhow::Result<Option<Alert>> {
        Ok(record_block_number(
            self.source.as_ref(),
            ctx,
            context_keys::REF_BLOCK_NUMBER,
            alert_names::REF_CONNECTION_ERROR,
        )
        .await)
    }
}
