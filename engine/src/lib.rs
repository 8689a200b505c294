//! Check pipeline engine for eth-health
//!
//! The [`Engine`] runs its checks in order over a fresh context, stops at the
//! first alert, and hands that alert to the handler registered under its
//! name. Handlers render a message and deliver it through the
//! [`Transporter`], which fans it out to every configured transport at once.

pub mod engine;
pub mod handler;
pub mod render;
pub mod transporter;

pub use engine::{Engine, EngineError, RunOutcome};
pub use handler::{AlertHandler, NotifyHandler};
pub use render::{AlertRenderers, RenderError, RenderFn, RenderedMessage};
pub use transporter::{DeliveryOutcome, DeliveryReport, Transporter};
