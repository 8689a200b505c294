use async_trait::async_trait;
use health_common::{DeliveryReceipt, Transport, TransportError};
use std::time::Duration;
use tracing::debug;

use crate::client::MandrillClient;
use crate::config::EmailTransportConfig;

/// Email delivery through Mandrill
pub struct EmailTransport {
    client: MandrillClient,
    config: EmailTransportConfig,
}

impl EmailTransport {
    pub fn new(config: EmailTransportConfig) -> Result<Self, TransportError> {
        config.validate().map_err(|e| {
            TransportError::InvalidConfiguration(format!("Config validation failed: {}", e))
        })?;

        let client = MandrillClient::new(
            config.api_key.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transport for EmailTransport {
    fn kind(&self) -> &str {
        "email"
    }

    fn default_destination(&self) -> Option<&str> {
        self.config.recipient.as_deref()
    }

    async fn send_to(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, TransportError> {
        if to.is_empty() {
            return Err(TransportError::MissingDestination);
        }

        let response = self
            .client
            .send(
                &self.config.from,
                self.config.from_name.as_deref(),
                to,
                subject,
                body,
            )
            .await?;

        debug!(
            "[msg:email] ({} {}) {} => {}",
            response.id.as_deref().unwrap_or("-"),
            response.status,
            to,
            subject
        );

        let mut receipt = DeliveryReceipt::new(to).with_response(response.status);
        if let Some(id) = response.id {
            receipt = receipt.with_message_id(id);
        }
        Ok(receipt)
    }
}
