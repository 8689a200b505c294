//! # eth-health
//!
//! Verifies that a local Ethereum node is within a configured number of
//! blocks of a reference chain height, and notifies operators by email and
//! Slack when it is not. One invocation performs one run; scheduling is left
//! to cron or a similar trigger.

pub mod config;
pub mod setup;

pub use config::{HealthConfig, Network};
pub use setup::{build_engine, build_transporter, init_logging, local_hostname};
