//! Webhook module for image policy admission reviews.
//!
//! This module provides the validating webhook endpoint and the wire contracts it speaks:
//! - AdmissionReview (`admission.k8s.io/v1`) wrapping a Pod
//! - ImageReview (`imagepolicy.k8s.io/v1alpha1`), with or without `status.reason`

pub mod error;
pub mod protocol;
mod server;

pub use error::{DecodeError, EncodeError, ReviewError, WebhookError};
pub use protocol::{
    AdmissionReviewAdapter, ImageReviewAdapter, Protocol, ProtocolAdapter, Review,
};
pub use server::{
    DEFAULT_PORT, MAX_BODY_BYTES, SHUTDOWN_GRACE_PERIOD, WebhookState, create_webhook_router,
    run_webhook_server,
};
