use eth_health::{build_engine, HealthConfig};
use health_engine::RunOutcome;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use slack_transport::SlackTransportConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    node: MockServer,
    explorer: MockServer,
    slack: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            node: MockServer::start().await,
            explorer: MockServer::start().await,
            slack: MockServer::start().await,
        }
    }

    async fn node_height(&self, height: &str) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": height
            })))
            .mount(&self.node)
            .await;
    }

    async fn explorer_height(&self, height: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 83,
                "result": height
            })))
            .expect(expected_calls)
            .mount(&self.explorer)
            .await;
    }

    async fn slack_accepts(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(expected_calls)
            .mount(&self.slack)
            .await;
    }

    fn config(&self) -> HealthConfig {
        HealthConfig {
            node_url: self.node.uri(),
            reference_url: Some(format!(
                "{}/api?module=proxy&action=eth_blockNumber",
                self.explorer.uri()
            )),
            slack: Some(SlackTransportConfig::new(
                format!("{}/hook", self.slack.uri()),
                "#node-alerts",
            )),
            ..HealthConfig::default()
        }
    }

    async fn slack_texts(&self) -> Vec<String> {
        self.slack
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                body["text"].as_str().unwrap_or_default().to_string()
            })
            .collect()
    }
}

#[tokio::test]
async fn test_node_in_sync_sends_nothing() {
    let harness = Harness::start().await;
    harness.node_height("0x64").await; // 100
    harness.explorer_height("0x6a", 1).await; // 106
    harness.slack_accepts(0).await;

    let engine = build_engine(&harness.config(), "node-1").unwrap();
    let outcome = engine.execute().await.unwrap();

    assert_eq!(outcome, RunOutcome::Passed);
}

#[tokio::test]
async fn test_lagging_node_notifies_slack() {
    let harness = Harness::start().await;
    harness.node_height("0x64").await; // 100
    harness.explorer_height("0x73", 1).await; // 115
    harness.slack_accepts(1).await;

    let engine = build_engine(&harness.config(), "node-1").unwrap();
    let outcome = engine.execute().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Handled {
            alert: "blocksAwayError".to_string()
        }
    );
    assert_eq!(
        harness.slack_texts().await,
        vec!["(node-1) ETH node lagging behind".to_string()]
    );

    let requests = harness.slack.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["channel"], "#node-alerts");
    assert!(body.to_string().contains("ETH node is behind REF by 15 blocks"));
}

#[tokio::test]
async fn test_node_down_skips_reference_lookup() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&harness.node)
        .await;
    harness.explorer_height("0x73", 0).await;
    harness.slack_accepts(1).await;

    let engine = build_engine(&harness.config(), "node-1").unwrap();
    let outcome = engine.execute().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Handled {
            alert: "ethConnectionError".to_string()
        }
    );
    assert_eq!(
        harness.slack_texts().await,
        vec!["(node-1) ETH node connection error".to_string()]
    );
}

#[tokio::test]
async fn test_zero_reference_height_reports_missing_numbers() {
    let harness = Harness::start().await;
    harness.node_height("0x64").await;
    harness.explorer_height("0x0", 1).await;
    harness.slack_accepts(1).await;

    let engine = build_engine(&harness.config(), "node-1").unwrap();
    let outcome = engine.execute().await.unwrap();

    assert_eq!(outcome.alert(), Some("noBlockNumbersError"));
    assert_eq!(
        harness.slack_texts().await,
        vec!["(node-1) Unable to fetch block numbers :(".to_string()]
    );
}

#[tokio::test]
async fn test_slack_failure_is_reported_not_raised() {
    let harness = Harness::start().await;
    harness.node_height("0x64").await;
    harness.explorer_height("0x73", 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&harness.slack)
        .await;

    let engine = build_engine(&harness.config(), "node-1").unwrap();
    let outcome = engine.execute().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::HandlerFailed {
            alert: "blocksAwayError".to_string()
        }
    );
}
