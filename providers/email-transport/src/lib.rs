pub mod client;
pub mod config;
pub mod transport;

pub use client::{MandrillClient, MandrillResponse, MANDRILL_BASE_URL};
pub use config::EmailTransportConfig;
pub use transport::EmailTransport;
