//! Fan-out of one message to every registered transport
//!
//! All transports are attempted concurrently and every outcome is kept, so a
//! failing transport never hides or cancels its siblings.

use futures::future::join_all;
use health_common::{DeliveryReceipt, Transport, TransportError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of delivering through one named transport
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub transport: String,
    pub result: Result<DeliveryReceipt, TransportError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-transport results of a fan-out send, ordered by transport name
#[derive(Debug, Default)]
pub struct DeliveryReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    fn new(mut outcomes: Vec<DeliveryOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.transport.cmp(&b.transport));
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    pub fn get(&self, transport: &str) -> Option<&DeliveryOutcome> {
        self.outcomes.iter().find(|o| o.transport == transport)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failed_transports(&self) -> Vec<&str> {
        self.failures().map(|o| o.transport.as_str()).collect()
    }

    /// True when every transport delivered; vacuously true with no transports
    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Named collection of transports
#[derive(Clone, Default)]
pub struct Transporter {
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl fmt::Debug for Transporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transporter")
            .field("transports", &self.names())
            .finish()
    }
}

impl Transporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transport, returning the one it replaced under the same name
    pub fn add_transport(
        &mut self,
        name: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Option<Arc<dyn Transport>> {
        self.transports.insert(name.into(), transport)
    }

    pub fn del_transport(&mut self, name: &str) -> Option<Arc<dyn Transport>> {
        self.transports.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Transport>> {
        self.transports.get(name)
    }

    /// Registered transport names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Deliver through a single named transport
    ///
    /// Returns `None` when no transport is registered under `name`.
    pub async fn send(
        &self,
        name: &str,
        subject: &str,
        body: &str,
    ) -> Option<Result<DeliveryReceipt, TransportError>> {
        let Some(transport) = self.transports.get(name) else {
            debug!("No transport named {}, skipping", name);
            return None;
        };

        Some(transport.send(subject, body).await)
    }

    /// Deliver through every registered transport concurrently
    ///
    /// Waits for all transports to settle and reports each outcome.
    pub async fn send_all(&self, subject: &str, body: &str) -> DeliveryReport {
        let deliveries = self.transports.iter().map(|(name, transport)| async move {
            let result = transport.send(subject, body).await;
            match &result {
                Ok(receipt) => debug!(
                    transport = %name,
                    destination = %receipt.destination,
                    "Delivered: {}",
                    subject
                ),
                Err(e) => warn!(transport = %name, "Delivery failed: {}", e),
            }
            DeliveryOutcome {
                transport: name.clone(),
                result,
            }
        });

        DeliveryReport::new(join_all(deliveries).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubTransport {
        fail: bool,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubTransport {
        fn ok() -> Arc<Self> {
            Self::build(false, Duration::ZERO)
        }

        fn failing() -> Arc<Self> {
            Self::build(true, Duration::ZERO)
        }

        fn build(fail: bool, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                fail,
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        fn kind(&self) -> &str {
            "stub"
        }

        fn default_destination(&self) -> Option<&str> {
            Some("stub-destination")
        }

        async fn send_to(
            &self,
            destination: &str,
            _subject: &str,
            _body: &str,
        ) -> Result<DeliveryReceipt, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                Err(TransportError::Network("connection refused".to_string()))
            } else {
                Ok(DeliveryReceipt::new(destination).with_message_id("msg-1"))
            }
        }
    }

    #[tokio::test]
    async fn test_send_all_attempts_every_transport() {
        let t1 = StubTransport::ok();
        let t2 = StubTransport::failing();

        let mut transporter = Transporter::new();
        transporter.add_transport("t1", t1.clone());
        transporter.add_transport("t2", t2.clone());

        let report = transporter.send_all("subject", "body").await;

        assert_eq!(t1.calls.load(Ordering::SeqCst), 1);
        assert_eq!(t2.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.len(), 2);
        assert!(report.get("t1").unwrap().is_success());
        assert!(matches!(
            report.get("t2").unwrap().result,
            Err(TransportError::Network(_))
        ));
        assert_eq!(report.failed_transports(), vec!["t2"]);
        assert!(!report.all_succeeded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_all_runs_transports_concurrently() {
        let mut transporter = Transporter::new();
        for name in ["a", "b", "c"] {
            transporter.add_transport(name, StubTransport::build(false, Duration::from_secs(5)));
        }

        let started = tokio::time::Instant::now();
        let report = transporter.send_all("subject", "body").await;

        assert!(report.all_succeeded());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_send_single_transport() {
        let t1 = StubTransport::ok();
        let t2 = StubTransport::ok();

        let mut transporter = Transporter::new();
        transporter.add_transport("t1", t1.clone());
        transporter.add_transport("t2", t2.clone());

        let result = transporter.send("t1", "subject", "body").await;

        assert!(matches!(result, Some(Ok(_))));
        assert_eq!(t1.calls.load(Ordering::SeqCst), 1);
        assert_eq!(t2.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_unknown_transport_is_noop() {
        let transporter = Transporter::new();
        assert!(transporter.send("missing", "subject", "body").await.is_none());
    }

    #[tokio::test]
    async fn test_send_all_without_transports() {
        let report = Transporter::new().send_all("subject", "body").await;
        assert!(report.is_empty());
        assert!(report.all_succeeded());
    }

    #[test]
    fn test_add_replaces_and_del_removes() {
        let mut transporter = Transporter::new();
        assert!(transporter.add_transport("email", StubTransport::ok()).is_none());
        assert!(transporter.add_transport("email", StubTransport::failing()).is_some());
        assert_eq!(transporter.len(), 1);

        assert!(transporter.del_transport("email").is_some());
        assert!(transporter.del_transport("email").is_none());
        assert!(transporter.is_empty());
    }
}
