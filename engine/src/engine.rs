use futures::FutureExt;
use health_common::{Alert, Check, CheckContext};
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::handler::AlertHandler;
use crate::transporter::{DeliveryReport, Transporter};

#[derive(Debug, Error)]
pub enum EngineError {
    /// `send_alert` was called before a transporter was set
    #[error("No transporter specified for alerts")]
    NoTransporter,

    /// A check returned an error instead of an alert
    #[error("Check {check} raised an error: {error:#}")]
    Check { check: String, error: anyhow::Error },
}

/// How a single engine run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every check passed
    Passed,
    /// An alert was raised and its handler completed
    Handled { alert: String },
    /// An alert was raised with no handler registered for it
    Unhandled { alert: String },
    /// An alert was raised and its handler failed
    HandlerFailed { alert: String },
}

impl RunOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, RunOutcome::Passed)
    }

    /// Name of the alert that stopped the run
    pub fn alert(&self) -> Option<&str> {
        match self {
            RunOutcome::Passed => None,
            RunOutcome::Handled { alert }
            | RunOutcome::Unhandled { alert }
            | RunOutcome::HandlerFailed { alert } => Some(alert),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Passed => write!(f, "passed"),
            RunOutcome::Handled { alert } => write!(f, "alert {} handled", alert),
            RunOutcome::Unhandled { alert } => write!(f, "alert {} unhandled", alert),
            RunOutcome::HandlerFailed { alert } => write!(f, "alert {} handler failed", alert),
        }
    }
}

/// Ordered check pipeline with alert dispatch
///
/// Checks run strictly one after another over a context created for the run,
/// because later checks read what earlier ones wrote. The first alert stops
/// the run and is handed to the handler registered under its name.
#[derive(Default)]
pub struct Engine {
    checks: Vec<Arc<dyn Check>>,
    handlers: HashMap<String, Arc<dyn AlertHandler>>,
    transporter: Option<Transporter>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let checks: Vec<&str> = self.checks.iter().map(|c| c.name()).collect();
        let mut handlers: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("Engine")
            .field("checks", &checks)
            .field("handlers", &handlers)
            .field("transporter", &self.transporter)
            .finish()
    }
}

impl Engine {
    /// Create an engine without a transporter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transporter(transporter: Transporter) -> Self {
        Self {
            transporter: Some(transporter),
            ..Self::default()
        }
    }

    pub fn set_transporter(&mut self, transporter: Transporter) {
        self.transporter = Some(transporter);
    }

    pub fn transporter(&self) -> Option<&Transporter> {
        self.transporter.as_ref()
    }

    /// Append a check to the end of the pipeline
    pub fn add_check(&mut self, check: Arc<dyn Check>) {
        self.checks.push(check);
    }

    pub fn add_checks(&mut self, checks: impl IntoIterator<Item = Arc<dyn Check>>) {
        self.checks.extend(checks);
    }

    pub fn clear_checks(&mut self) {
        self.checks.clear();
    }

    pub fn checks(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    /// Register a handler, replacing any previous handler for the alert
    pub fn add_handler(&mut self, alert: impl Into<String>, handler: Arc<dyn AlertHandler>) {
        self.handlers.insert(alert.into(), handler);
    }

    pub fn add_handlers<N: Into<String>>(
        &mut self,
        handlers: impl IntoIterator<Item = (N, Arc<dyn AlertHandler>)>,
    ) {
        for (alert, handler) in handlers {
            self.add_handler(alert, handler);
        }
    }

    pub fn del_handler(&mut self, alert: &str) -> Option<Arc<dyn AlertHandler>> {
        self.handlers.remove(alert)
    }

    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    pub fn has_handler(&self, alert: &str) -> bool {
        self.handlers.contains_key(alert)
    }

    /// Alerts from `alerts` that have no registered handler
    pub fn missing_handlers<'a>(&self, alerts: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        alerts
            .into_iter()
            .filter(|alert| !self.has_handler(alert))
            .collect()
    }

    /// Deliver a message through every transport of the transporter
    pub async fn send_alert(&self, subject: &str, body: &str) -> Result<DeliveryReport, EngineError> {
        let transporter = self.transporter.as_ref().ok_or(EngineError::NoTransporter)?;
        Ok(transporter.send_all(subject, body).await)
    }

    /// Run every check once, in order, stopping at the first alert
    ///
    /// Unhandled alerts and handler failures are logged and reported through
    /// the returned outcome. Only an error raised by a check itself is
    /// returned as `Err`.
    pub async fn execute(&self) -> Result<RunOutcome, EngineError> {
        let mut ctx = CheckContext::new();

        for check in &self.checks {
            debug!(check = check.name(), "Running check");

            let alert = check
                .execute(&mut ctx)
                .await
                .map_err(|error| EngineError::Check {
                    check: check.name().to_string(),
                    error,
                })?;

            match alert {
                None => info!(check = check.name(), "✅ Pass"),
                Some(alert) => {
                    info!(check = check.name(), "❌ Fail => {}", alert);
                    return Ok(self.dispatch(alert).await);
                }
            }
        }

        Ok(RunOutcome::Passed)
    }

    async fn dispatch(&self, alert: Alert) -> RunOutcome {
        let Some(handler) = self.handlers.get(&alert.name) else {
            error!(alert = %alert.name, "Unhandled alert ({})", alert.name);
            return RunOutcome::Unhandled { alert: alert.name };
        };

        let handled = AssertUnwindSafe(handler.handle(&alert.name, &alert.params, self))
            .catch_unwind()
            .await;

        match handled {
            Ok(Ok(())) => RunOutcome::Handled { alert: alert.name },
            Ok(Err(e)) => {
                error!(alert = %alert.name, "Alert handler failed: {:#}", e);
                RunOutcome::HandlerFailed { alert: alert.name }
            }
            Err(_) => {
                error!(alert = %alert.name, "Alert handler panicked");
                RunOutcome::HandlerFailed { alert: alert.name }
            }
        }
    }
}
