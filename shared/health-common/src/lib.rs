//! Shared types and traits for the eth-health check pipeline
//!
//! This library defines the pieces every crate in the workspace agrees on:
//! the [`Alert`] a check raises, the run-scoped [`CheckContext`], and the
//! [`Check`] and [`Transport`] capabilities the engine drives.

pub mod alert;
pub mod check;
pub mod context;
pub mod transport;

pub use alert::{names as alert_names, Alert, AlertParams};
pub use check::Check;
pub use context::{keys as context_keys, CheckContext};
pub use transport::{DeliveryReceipt, Transport, TransportError};
