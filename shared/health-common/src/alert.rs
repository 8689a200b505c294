use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Parameters attached to an alert, keyed by name
pub type AlertParams = BTreeMap<String, Value>;

/// Alert names raised by the node sync checks
pub mod names {
    /// The local node could not be reached
    pub const ETH_CONNECTION_ERROR: &str = "ethConnectionError";
    /// The reference explorer could not be reached
    pub const REF_CONNECTION_ERROR: &str = "refConnectionError";
    /// One of the block numbers is missing or zero
    pub const NO_BLOCK_NUMBERS_ERROR: &str = "noBlockNumbersError";
    /// The local node lags the reference by more than the threshold
    pub const BLOCKS_AWAY_ERROR: &str = "blocksAwayError";

    /// Every alert name a check in this workspace can produce
    pub const ALL: [&str; 4] = [
        ETH_CONNECTION_ERROR,
        REF_CONNECTION_ERROR,
        NO_BLOCK_NUMBERS_ERROR,
        BLOCKS_AWAY_ERROR,
    ];
}

/// A named, parameterized failure signal produced by a check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub name: String,
    #[serde(default)]
    pub params: AlertParams,
}

impl Alert {
    /// Create an alert with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: AlertParams::new(),
        }
    }

    /// Attach a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach an error as the `err` parameter, keeping the full cause chain
    pub fn with_error<E: Error + ?Sized>(self, err: &E) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        self.with_param("err", message)
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            let params = serde_json::to_string(&self.params).map_err(|_| fmt::Error)?;
            write!(f, "{} {}", self.name, params)
        }
    }
}
