use async_trait::async_trait;
use health_common::{alert_names, context_keys, Alert, Check, CheckContext};
use tracing::debug;

/// Default number of blocks the node may trail the reference
pub const DEFAULT_MAX_BLOCKS_AWAY: u64 = 10;

/// Compares `ethBlockNumber` and `refBlockNumber` against a lag threshold
///
/// Must run after the checks that populate both keys. A missing or zero
/// height raises `noBlockNumbersError`; a lag above `blocks` raises
/// `blocksAwayError`. A node ahead of the reference passes.
#[derive(Debug, Clone)]
pub struct BlocksAwayCheck {
    blocks: u64,
}

impl BlocksAwayCheck {
    pub fn new(blocks: u64) -> Self {
        Self { blocks }
    }

    pub fn threshold(&self) -> u64 {
        self.blocks
    }
}

impl Default for BlocksAwayCheck {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOCKS_AWAY)
    }
}

#[async_trait]
impl Check for BlocksAwayCheck {
    fn name(&self) -> &str {
        "BlocksAwayCheck"
    }

    async fn execute(&self, ctx: &mut CheckContext) -> anyhow::Result<Option<Alert>> {
        let eth = ctx
            .get_u64(context_keys::ETH_BLOCK_NUMBER)
            .filter(|n| *n != 0);
        let reference = ctx
            .get_u64(context_keys::REF_BLOCK_NUMBER)
            .filter(|n| *n != 0);

        // Data available
        let (Some(eth), Some(reference)) = (eth, reference) else {
            debug!("Unable to fetch block numbers");
            return Ok(Some(Alert::new(alert_names::NO_BLOCK_NUMBERS_ERROR)));
        };

        // No lag when the node is level with or ahead of the reference
        let lag = reference.checked_sub(eth).filter(|lag| *lag > self.blocks);
        if let Some(blocks_away) = lag {
            debug!(
                "REF ({}) is {} blocks ahead of node ({})",
                reference, blocks_away, eth
            );
            return Ok(Some(
                Alert::new(alert_names::BLOCKS_AWAY_ERROR).with_param("blocksAway", blocks_away),
            ));
        }

        Ok(None)
    }
}
