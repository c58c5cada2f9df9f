//! imagine-webhook library crate
//!
//! This module exports the image name policy, the admission protocol adapters and
//! the TLS webhook server that ties them together.

pub mod config;
pub mod policy;
pub mod webhooks;

pub use config::{Config, LogFormat};
pub use policy::{Polarity, PolicyConfig, Verdict, evaluate};
pub use webhooks::{
    DEFAULT_PORT, MAX_BODY_BYTES, Protocol, ProtocolAdapter, WebhookError, WebhookState,
    create_webhook_router, run_webhook_server,
};
