use anyhow::{bail, Context, Result};
use email_transport::EmailTransport;
use health_common::{alert_names, Check};
use health_engine::{AlertRenderers, Engine, NotifyHandler, Transporter};
use node_checks::{BlocksAwayCheck, NodeConnectionCheck, ReferenceNodeCheck};
use slack_transport::SlackTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::HealthConfig;

const UNKNOWN_HOST: &str = "unknown-host";

/// Install the global subscriber; `RUST_LOG` wins over `verbose`
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("Could not resolve hostname, using {}: {}", UNKNOWN_HOST, e);
            UNKNOWN_HOST.to_string()
        }
    }
}

/// One transport per configured section, named "email" and "slack"
pub fn build_transporter(config: &HealthConfig) -> Result<Transporter> {
    let mut transporter = Transporter::new();

    if let Some(email) = &config.email {
        let transport = EmailTransport::new(email.clone()).context("email transport")?;
        transporter.add_transport("email", Arc::new(transport));
    }

    if let Some(slack) = &config.slack {
        let transport = SlackTransport::new(slack.clone()).context("slack transport")?;
        transporter.add_transport("slack", Arc::new(transport));
    }

    if transporter.is_empty() {
        warn!("No transports configured, alerts will not be delivered");
    } else {
        info!("Alert transports: {}", transporter.names().join(", "));
    }

    Ok(transporter)
}

/// Wire the sync pipeline: node height, reference height, then lag
pub fn build_engine(config: &HealthConfig, hostname: &str) -> Result<Engine> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let reference_url = config.reference_url();

    let checks: Vec<Arc<dyn Check>> = vec![
        Arc::new(
            NodeConnectionCheck::from_url(&config.node_url, timeout)
                .with_context(|| format!("node source for {}", config.node_url))?,
        ),
        Arc::new(
            ReferenceNodeCheck::from_url(&reference_url, timeout)
                .with_context(|| format!("reference source for {}", reference_url))?,
        ),
        Arc::new(BlocksAwayCheck::new(config.blocks)),
    ];

    let mut engine = Engine::with_transporter(build_transporter(config)?);
    engine.add_checks(checks);

    let renderers = Arc::new(AlertRenderers::with_defaults(hostname));
    renderers.ensure_covers(alert_names::ALL)?;
    NotifyHandler::install(&mut engine, renderers);

    let missing = engine.missing_handlers(alert_names::ALL);
    if !missing.is_empty() {
        bail!("No handler registered for alerts: {}", missing.join(", "));
    }

    Ok(engine)
}
