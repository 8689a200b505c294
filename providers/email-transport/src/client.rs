use health_common::TransportError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default Mandrill API endpoint
pub const MANDRILL_BASE_URL: &str = "https://mandrillapp.com/api/1.0";

/// Per-recipient result returned by `messages/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MandrillResponse {
    pub email: String,
    pub status: String,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
}

impl MandrillResponse {
    fn is_accepted(&self) -> bool {
        matches!(self.status.as_str(), "sent" | "queued" | "scheduled")
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    key: &'a str,
    message: SendMessage<'a>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    subject: &'a str,
    text: &'a str,
    from_email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_name: Option<&'a str>,
    to: Vec<Recipient<'a>>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct MandrillError {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

/// Mandrill transactional email API client
pub struct MandrillClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MandrillClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfiguration(e.to_string()))?;

        let base_url = base_url.unwrap_or_else(|| MANDRILL_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a plain-text message to a single recipient
    pub async fn send(
        &self,
        from_email: &str,
        from_name: Option<&str>,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<MandrillResponse, TransportError> {
        let request = SendRequest {
            key: &self.api_key,
            message: SendMessage {
                subject,
                text,
                from_email,
                from_name,
                to: vec![Recipient {
                    email: to,
                    kind: "to",
                }],
            },
        };

        let response = self
            .client
            .post(format!("{}/messages/send.json", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send email request: {}", e);
                if e.is_timeout() {
                    TransportError::NetworkTimeout
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        match status {
            StatusCode::OK => {
                let results: Vec<MandrillResponse> = response.json().await.map_err(|e| {
                    error!("Failed to parse Mandrill response: {}", e);
                    TransportError::ExternalService(format!("Invalid response format: {}", e))
                })?;

                let result = results.into_iter().next().ok_or_else(|| {
                    TransportError::ExternalService("Empty response from Mandrill".to_string())
                })?;

                if result.is_accepted() {
                    debug!("Email accepted by Mandrill with status {}", result.status);
                    Ok(result)
                } else {
                    let reason = result
                        .reject_reason
                        .clone()
                        .unwrap_or_else(|| result.status.clone());
                    warn!("Email to {} rejected: {}", result.email, reason);
                    Err(TransportError::Rejected { reason })
                }
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("Authentication failed with Mandrill");
                Err(TransportError::InvalidAuthentication)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Mandrill rate limit exceeded");
                Err(TransportError::ExternalService(
                    "Rate limit exceeded".to_string(),
                ))
            }
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                match serde_json::from_str::<MandrillError>(&error_body) {
                    Ok(err) if err.name == "Invalid_Key" => {
                        error!("Mandrill rejected the API key");
                        Err(TransportError::InvalidAuthentication)
                    }
                    Ok(err) => {
                        error!("Mandrill error {}: {}", err.name, err.message);
                        Err(TransportError::ExternalService(format!(
                            "{}: {}",
                            err.name, err.message
                        )))
                    }
                    Err(_) => {
                        error!("Unexpected response status: {}", status);
                        Err(TransportError::ExternalService(format!(
                            "Unexpected status code: {}",
                            status
                        )))
                    }
                }
            }
        }
    }
}
