//! Node sync checks
//!
//! Three checks compose into the sync pipeline: [`NodeConnectionCheck`] and
//! [`ReferenceNodeCheck`] read block heights into the run context, and
//! [`BlocksAwayCheck`] compares them against a lag threshold.

pub mod blocks_away;
pub mod node;
pub mod reference;
pub mod source;

pub use blocks_away::{BlocksAwayCheck, DEFAULT_MAX_BLOCKS_AWAY};
pub use node::NodeConnectionCheck;
pub use reference::ReferenceNodeCheck;
pub use source::{
    parse_block_number, BlockHeightSource, ExplorerSource, JsonRpcSource, SourceError,
    DEFAULT_NODE_URL,
};
