use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base trait that all notification transports must implement
///
/// A transport is configured once at construction (credentials, default
/// destination) and is read-only afterwards. Delivery failures are returned
/// as `Err`, never panicked, so callers can aggregate them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Kind of backend, e.g. "email" or "slack"
    fn kind(&self) -> &str;

    /// Destination used by [`Transport::send`]
    fn default_destination(&self) -> Option<&str>;

    /// Deliver a message to an explicit destination
    async fn send_to(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, TransportError>;

    /// Deliver a message to the configured default destination
    async fn send(&self, subject: &str, body: &str) -> Result<DeliveryReceipt, TransportError> {
        match self.default_destination() {
            Some(destination) => self.send_to(destination, subject, body).await,
            None => Err(TransportError::MissingDestination),
        }
    }
}

/// Acknowledgment returned by a successful delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Backend message id when the backend returns one
    pub message_id: Option<String>,
    pub destination: String,
    pub response: Option<String>,
    pub delivered_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            message_id: None,
            destination: destination.into(),
            response: None,
            delivered_at: Utc::now(),
        }
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

/// Transport delivery error types
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("A destination to send to is required")]
    MissingDestination,

    #[error("Invalid API key or authentication")]
    InvalidAuthentication,

    #[error("Network timeout")]
    NetworkTimeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Message rejected: {reason}")]
    Rejected { reason: String },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
