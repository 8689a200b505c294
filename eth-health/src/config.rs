use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use email_transport::EmailTransportConfig;
use node_checks::{ExplorerSource, DEFAULT_MAX_BLOCKS_AWAY, DEFAULT_NODE_URL};
use serde::{Deserialize, Serialize};
use slack_transport::SlackTransportConfig;
use std::env;
use std::fmt;

/// Network the reference explorer is queried for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Ropsten,
}

impl Network {
    /// Explorer host prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "api",
            Network::Ropsten => "ropsten",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Ropsten => write!(f, "ropsten"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Blocks the node may trail the reference before alerting
    pub blocks: u64,
    pub verbose: bool,
    pub network: Network,
    pub node_url: String,
    /// Overrides the explorer URL derived from `network`
    #[serde(default)]
    pub reference_url: Option<String>,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub email: Option<EmailTransportConfig>,
    #[serde(default)]
    pub slack: Option<SlackTransportConfig>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_MAX_BLOCKS_AWAY,
            verbose: false,
            network: Network::Mainnet,
            node_url: DEFAULT_NODE_URL.to_string(),
            reference_url: None,
            request_timeout_secs: 10,
            email: None,
            slack: None,
        }
    }
}

impl HealthConfig {
    /// Builder preloaded with defaults
    ///
    /// `NETWORK=ropsten` selects the ropsten explorer unless the network is
    /// set by a later source.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let network = match env::var("NETWORK") {
            Ok(network) if network == "ropsten" => "ropsten",
            _ => "mainnet",
        };

        Config::builder()
            .set_default("blocks", DEFAULT_MAX_BLOCKS_AWAY)?
            .set_default("verbose", false)?
            .set_default("network", network)?
            .set_default("node_url", DEFAULT_NODE_URL)?
            .set_default("request_timeout_secs", 10)
    }

    /// Load from defaults, an optional file and `ETH_HEALTH__*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut builder = Self::builder()?;

        // Try to load from config file if it exists
        if let Ok(config_path) = env::var("ETH_HEALTH_CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path));
        }

        // Override with environment variables
        builder = builder.add_source(
            Environment::with_prefix("ETH_HEALTH")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Explorer URL for the reference block height
    pub fn reference_url(&self) -> String {
        self.reference_url
            .clone()
            .unwrap_or_else(|| ExplorerSource::etherscan_url(self.network.prefix()))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.node_url.is_empty() {
            return Err("Node URL is required".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if let Some(email) = &self.email {
            email.validate().map_err(|e| format!("email: {}", e))?;
        }

        if let Some(slack) = &self.slack {
            slack.validate().map_err(|e| format!("slack: {}", e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pretty_assertions::assert_eq;

    fn from_toml(toml: &str) -> HealthConfig {
        let builder = HealthConfig::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml));
        HealthConfig::from_builder(builder).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");

        assert_eq!(config.blocks, 10);
        assert!(!config.verbose);
        assert_eq!(config.node_url, "http://localhost:8545");
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.email.is_none());
        assert!(config.slack.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transport_sections() {
        let config = from_toml(
            r##"
            blocks = 25
            verbose = true
            network = "ropsten"

            [email]
            api_key = "md-key"
            from = "health@example.com"
            recipient = "ops@example.com"

            [slack]
            webhook_url = "https://hooks.slack.com/services/T/B/X"
            channel = "#node-alerts"
            "##,
        );

        assert_eq!(config.blocks, 25);
        assert!(config.verbose);
        assert_eq!(config.network, Network::Ropsten);
        assert_eq!(
            config.reference_url(),
            "http://ropsten.etherscan.io/api?module=proxy&action=eth_blockNumber"
        );
        assert_eq!(
            config.email.as_ref().unwrap().recipient.as_deref(),
            Some("ops@example.com")
        );
        assert_eq!(config.slack.as_ref().unwrap().channel, "#node-alerts");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reference_url_override() {
        let config = HealthConfig {
            reference_url: Some("http://explorer.local/api".to_string()),
            ..HealthConfig::default()
        };
        assert_eq!(config.reference_url(), "http://explorer.local/api");
    }

    #[test]
    fn test_validation_errors() {
        let config = HealthConfig {
            request_timeout_secs: 0,
            ..HealthConfig::default()
        };
        assert!(config.validate().is_err());

        let config = HealthConfig {
            slack: Some(SlackTransportConfig::new("", "#ops")),
            ..HealthConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            "slack: Slack webhook URL is required"
        );
    }
}
