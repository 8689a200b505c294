//! Alert to message rendering
//!
//! Each alert name maps to a pure function producing a subject and body.
//! Subjects are tagged with the host the checks ran on.

use health_common::{alert_names, AlertParams};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Rendered notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

impl RenderedMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn subject_only(subject: impl Into<String>) -> Self {
        Self::new(subject, String::new())
    }
}

/// Render function: `(hostname, params) -> message`
pub type RenderFn = fn(&str, &AlertParams) -> RenderedMessage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("No renderer registered for alert ({alert})")]
    MissingRenderer { alert: String },

    #[error("Alerts without a renderer: {}", alerts.join(", "))]
    Uncovered { alerts: Vec<String> },
}

/// Table of render functions keyed by alert name
#[derive(Clone)]
pub struct AlertRenderers {
    hostname: String,
    renderers: HashMap<String, RenderFn>,
}

impl fmt::Debug for AlertRenderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertRenderers")
            .field("hostname", &self.hostname)
            .field("alerts", &self.names())
            .finish()
    }
}

impl AlertRenderers {
    /// Create an empty table
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            renderers: HashMap::new(),
        }
    }

    /// Create a table covering every alert the node sync checks raise
    pub fn with_defaults(hostname: impl Into<String>) -> Self {
        let mut renderers = Self::new(hostname);
        renderers.register(alert_names::ETH_CONNECTION_ERROR, render_eth_connection_error);
        renderers.register(alert_names::REF_CONNECTION_ERROR, render_ref_connection_error);
        renderers.register(alert_names::NO_BLOCK_NUMBERS_ERROR, render_no_block_numbers);
        renderers.register(alert_names::BLOCKS_AWAY_ERROR, render_blocks_away);
        renderers
    }

    /// Register a renderer, replacing any previous one for the same alert
    pub fn register(&mut self, alert: impl Into<String>, render: RenderFn) {
        self.renderers.insert(alert.into(), render);
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn contains(&self, alert: &str) -> bool {
        self.renderers.contains_key(alert)
    }

    /// Alert names with a renderer, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn render(&self, alert: &str, params: &AlertParams) -> Result<RenderedMessage, RenderError> {
        let render = self
            .renderers
            .get(alert)
            .ok_or_else(|| RenderError::MissingRenderer {
                alert: alert.to_string(),
            })?;
        Ok(render(&self.hostname, params))
    }

    /// Fail if any of the given alert names has no renderer
    pub fn ensure_covers<'a>(
        &self,
        alerts: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RenderError> {
        let uncovered: Vec<String> = alerts
            .into_iter()
            .filter(|alert| !self.contains(alert))
            .map(str::to_string)
            .collect();

        if uncovered.is_empty() {
            Ok(())
        } else {
            Err(RenderError::Uncovered { alerts: uncovered })
        }
    }
}

fn render_eth_connection_error(host: &str, _params: &AlertParams) -> RenderedMessage {
    RenderedMessage::subject_only(format!("({}) ETH node connection error", host))
}

fn render_ref_connection_error(host: &str, _params: &AlertParams) -> RenderedMessage {
    RenderedMessage::subject_only(format!("({}) Etherscan connection error", host))
}

fn render_no_block_numbers(host: &str, _params: &AlertParams) -> RenderedMessage {
    RenderedMessage::subject_only(format!("({}) Unable to fetch block numbers :(", host))
}

fn render_blocks_away(host: &str, params: &AlertParams) -> RenderedMessage {
    let blocks_away = params
        .get("blocksAway")
        .map(ToString::to_string)
        .unwrap_or_else(|| "an unknown number of".to_string());

    RenderedMessage::new(
        format!("({}) ETH node lagging behind", host),
        format!("({}) ETH node is behind REF by {} blocks", host, blocks_away),
    )
}
