//! Block height sources
//!
//! A source is anything that can report the current chain height:
//! - [`JsonRpcSource`] asks a node over JSON-RPC (`eth_blockNumber`)
//! - [`ExplorerSource`] reads an explorer proxy endpoint returning `{ "result": ... }`
//!
//! Network errors, non-2xx statuses and unparseable payloads all surface as
//! [`SourceError`].

use async_trait::async_trait;
use health_common::{Alert, CheckContext};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default local node endpoint
pub const DEFAULT_NODE_URL: &str = "http://localhost:8545";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid block number payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// Anything that can report the current block height
#[async_trait]
pub trait BlockHeightSource: Send + Sync {
    /// Endpoint description used in log lines
    fn endpoint(&self) -> &str;

    async fn block_number(&self) -> Result<u64, SourceError>;
}

/// RPC request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        }
    }
}

/// RPC response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// RPC error structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Parse a block height the way block explorers and nodes report it
///
/// Accepts a `0x`-prefixed hex string, a decimal string, or a JSON number.
pub fn parse_block_number(value: &Value) -> Result<u64, SourceError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| SourceError::InvalidPayload(n.to_string())),
        Value::String(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse::<u64>(),
            };
            parsed.map_err(|_| SourceError::InvalidPayload(s.to_string()))
        }
        other => Err(SourceError::InvalidPayload(other.to_string())),
    }
}

fn build_client(timeout: Duration) -> Result<HttpClient, SourceError> {
    HttpClient::builder()
        .timeout(timeout)
        .user_agent("eth-health/0.1")
        .build()
        .map_err(|e| SourceError::Client(e.to_string()))
}

async fn read_json(response: reqwest::Response) -> Result<Value, SourceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| SourceError::InvalidPayload(e.to_string()))
}

/// Block height from a node's JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct JsonRpcSource {
    client: HttpClient,
    url: String,
}

impl JsonRpcSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl BlockHeightSource for JsonRpcSource {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn block_number(&self) -> Result<u64, SourceError> {
        let request = RpcRequest::new("eth_blockNumber", vec![]);
        debug!("Calling {} on {}", request.method, self.url);

        let response = self.client.post(&self.url).json(&request).send().await?;
        let body = read_json(response).await?;
        let response: RpcResponse = serde_json::from_value(body)
            .map_err(|e| SourceError::InvalidPayload(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(SourceError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| SourceError::InvalidPayload("missing result".to_string()))?;
        parse_block_number(&result)
    }
}

/// Block height from an explorer proxy endpoint (e.g. Etherscan `eth_blockNumber`)
#[derive(Debug, Clone)]
pub struct ExplorerSource {
    client: HttpClient,
    url: String,
}

impl ExplorerSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }

    /// Etherscan proxy URL for a network host prefix (`api`, `ropsten`, ...)
    pub fn etherscan_url(network_prefix: &str) -> String {
        format!(
            "http://{}.etherscan.io/api?module=proxy&action=eth_blockNumber",
            network_prefix
        )
    }
}

#[async_trait]
impl BlockHeightSource for ExplorerSource {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn block_number(&self) -> Result<u64, SourceError> {
        debug!("Fetching reference block number from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let body = read_json(response).await?;
        let result = body
            .get("result")
            .ok_or_else(|| SourceError::InvalidPayload("missing result".to_string()))?;
        parse_block_number(result)
    }
}

/// Write the source's height under `key`, or build `alert` carrying the error
pub(crate) async fn record_block_number(
    source: &dyn BlockHeightSource,
    ctx: &mut CheckContext,
    key: &str,
    alert: &str,
) -> Option<Alert> {
    match source.block_number().await {
        Ok(block_number) => {
            debug!("{} at block {}", source.endpoint(), block_number);
            ctx.insert(key, block_number);
            None
        }
        Err(e) => {
            debug!(endpoint = %source.endpoint(), "Block number unavailable: {}", e);
            Some(Alert::new(alert).with_error(&e))
        }
    }
}
