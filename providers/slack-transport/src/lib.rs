pub mod formatter;
pub mod slack_client;
pub mod transport;
pub mod types;

pub use slack_client::SlackClient;
pub use transport::{SlackTransport, SlackTransportConfig};
pub use types::SlackMessage;
