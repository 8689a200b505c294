use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTransportConfig {
    pub api_key: String,
    pub from: String,
    #[serde(default)]
    pub from_name: Option<String>,
    /// Default recipient for `send`
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl EmailTransportConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from: from.into(),
            from_name: None,
            recipient: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("Mandrill API key is required".to_string());
        }

        if !email_address::EmailAddress::is_valid(&self.from) {
            return Err(format!("Invalid from email: {}", self.from));
        }

        if let Some(recipient) = &self.recipient {
            if !email_address::EmailAddress::is_valid(recipient) {
                return Err(format!("Invalid recipient email: {}", recipient));
            }
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
