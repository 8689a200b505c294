use async_trait::async_trait;
use health_common::{DeliveryReceipt, Transport, TransportError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::formatter::format_slack_message;
use crate::slack_client::SlackClient;

/// Slack webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackTransportConfig {
    pub webhook_url: String,
    /// Default channel for `send`
    pub channel: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl SlackTransportConfig {
    pub fn new(webhook_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: channel.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.webhook_url.is_empty() {
            return Err("Slack webhook URL is required".to_string());
        }

        if !self.webhook_url.starts_with("http://") && !self.webhook_url.starts_with("https://")
        {
            return Err(format!("Invalid Slack webhook URL: {}", self.webhook_url));
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Chat delivery through a Slack incoming webhook
pub struct SlackTransport {
    client: SlackClient,
    config: SlackTransportConfig,
}

impl SlackTransport {
    pub fn new(config: SlackTransportConfig) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::InvalidConfiguration)?;
        let client = SlackClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transport for SlackTransport {
    fn kind(&self) -> &str {
        "slack"
    }

    fn default_destination(&self) -> Option<&str> {
        Some(self.config.channel.as_str()).filter(|c| !c.is_empty())
    }

    async fn send_to(
        &self,
        channel: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, TransportError> {
        let message = format_slack_message(channel, subject, body);
        self.client
            .send_message(&self.config.webhook_url, &message)
            .await?;

        debug!("[msg:slack] {} => {}", channel, subject);
        Ok(DeliveryReceipt::new(channel).with_response("ok"))
    }
}
