use anyhow::{bail, Result};
use async_trait::async_trait;
use health_common::AlertParams;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::render::AlertRenderers;

/// Reaction to an alert, registered on the engine under the alert name
///
/// Receives the owning engine so it can deliver through
/// [`Engine::send_alert`]. Errors are logged by the engine and never reach
/// the caller of [`Engine::execute`].
#[async_trait]
pub trait AlertHandler: Send + Sync {
    async fn handle(&self, alert: &str, params: &AlertParams, engine: &Engine) -> Result<()>;
}

/// Standard handler: render the alert and deliver it through every transport
#[derive(Debug, Clone)]
pub struct NotifyHandler {
    renderers: Arc<AlertRenderers>,
}

impl NotifyHandler {
    pub fn new(renderers: Arc<AlertRenderers>) -> Self {
        Self { renderers }
    }

    /// Register a notify handler for every alert the renderers know about
    pub fn install(engine: &mut Engine, renderers: Arc<AlertRenderers>) {
        let handler: Arc<dyn AlertHandler> = Arc::new(Self::new(renderers.clone()));
        for alert in renderers.names() {
            engine.add_handler(alert, handler.clone());
        }
    }
}

#[async_trait]
impl AlertHandler for NotifyHandler {
    async fn handle(&self, alert: &str, params: &AlertParams, engine: &Engine) -> Result<()> {
        let mut message = self.renderers.render(alert, params)?;

        // Add error if available
        if let Some(err) = params.get("err") {
            message.body.push_str("\nStack:\n");
            match err {
                Value::String(err) => message.body.push_str(err),
                other => message.body.push_str(&other.to_string()),
            }
        }

        let report = engine.send_alert(&message.subject, &message.body).await?;

        if report.is_empty() {
            warn!("No transports configured, alert {} was not delivered", alert);
            return Ok(());
        }

        let failed = report.failed_transports();
        if !failed.is_empty() {
            bail!(
                "Alert {} delivery failed via {} ({} of {} transports)",
                alert,
                failed.join(", "),
                failed.len(),
                report.len()
            );
        }

        info!(
            alert = %alert,
            transports = report.len(),
            "📨 Alert delivered: {}",
            message.subject
        );
        Ok(())
    }
}
