use async_trait::async_trait;
use health_common::{alert_names, context_keys, Alert, Check, CheckContext};
use std::sync::Arc;
use std::time::Duration;

use crate::source::{record_block_number, BlockHeightSource, JsonRpcSource, SourceError};

/// Reads the local node's block height into `ethBlockNumber`
///
/// Raises `ethConnectionError` with the cause in `err` when the node cannot
/// be queried.
pub struct NodeConnectionCheck {
    source: Arc<dyn BlockHeightSource>,
}

impl NodeConnectionCheck {
    pub fn new(source: Arc<dyn BlockHeightSource>) -> Self {
        Self { source }
    }

    /// Check a node over JSON-RPC at `url`
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self::new(Arc::new(JsonRpcSource::new(url, timeout)?)))
    }
}

#[async_trait]
impl Check for NodeConnectionCheck {
    fn name(&self) -> &str {
        "NodeConnectionCheck"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> anyhow::Result<Option<Alert>> {
        Ok(record_block_number(
            self.source.as_ref(),
            ctx,
            context_keys::ETH_BLOCK_NUMBER,
            alert_names::ETH_CONNECTION_ERROR,
        )
        .await)
    }
}
