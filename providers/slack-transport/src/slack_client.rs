use crate::types::SlackMessage;
use health_common::TransportError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Slack API client for sending webhook messages
pub struct SlackClient {
    http_client: Client,
}

impl SlackClient {
    /// Create new Slack client
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfiguration(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Send message to Slack via webhook
    pub async fn send_message(
        &self,
        webhook_url: &str,
        message: &SlackMessage,
    ) -> Result<(), TransportError> {
        debug!("Sending message to Slack webhook");

        let response = self
            .http_client
            .post(webhook_url)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::NetworkTimeout
                } else {
                    TransportError::Network(format!("Failed to send request to Slack: {}", e))
                }
            })?;

        let status = response.status();

        match status {
            StatusCode::OK => {
                let text = response.text().await.map_err(|e| {
                    TransportError::ExternalService(format!("Failed to read Slack response: {}", e))
                })?;

                if text == "ok" {
                    debug!("Slack message sent successfully");
                    Ok(())
                } else {
                    warn!("Unexpected Slack response: {}", text);
                    Err(TransportError::ExternalService(format!(
                        "Unexpected Slack response: {}",
                        text
                    )))
                }
            }
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND | StatusCode::GONE => {
                let error_text = response.text().await.unwrap_or_default();
                warn!("Slack webhook refused: {} {}", status, error_text);
                Err(TransportError::InvalidAuthentication)
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(TransportError::ExternalService(format!(
                    "Slack webhook returned status {}: {}",
                    status, error_text
                )))
            }
        }
    }
}
