//! Wire contracts understood by the webhook.
//!
//! Each contract decodes its request envelope into a [`Review`] (the container images
//! to check plus the untouched envelope) and encodes a [`Verdict`] back into the same
//! envelope. Fields unrelated to the decision pass through unchanged.

mod admission;
mod image_review;

pub use admission::AdmissionReviewAdapter;
pub use image_review::ImageReviewAdapter;

use std::sync::Arc;

use serde_json::Value;

use crate::policy::{Polarity, Verdict};
use crate::webhooks::error::{DecodeError, EncodeError};

/// A decoded review request
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Container image references, in request order
    pub images: Vec<String>,
    /// Correlation identifier carried by the request, if the contract has one
    pub uid: Option<String>,
    envelope: Value,
}

impl Review {
    pub(crate) fn new(images: Vec<String>, uid: Option<String>, envelope: Value) -> Self {
        Self {
            images,
            uid,
            envelope,
        }
    }

    /// Attach `value` under `field` of the echoed envelope and serialize it.
    pub(crate) fn respond(self, field: &str, value: Value) -> Result<Vec<u8>, EncodeError> {
        let mut envelope = self.envelope;
        match &mut envelope {
            Value::Object(map) => {
                map.insert(field.to_string(), value);
            }
            _ => return Err(EncodeError::NotAnObject),
        }
        Ok(serde_json::to_vec(&envelope)?)
    }
}

/// Parse a request body that must be a JSON object
pub(crate) fn parse_envelope(body: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(body)
        .map(Value::Object)
        .map_err(DecodeError::MalformedEnvelope)
}

/// Decode/encode capability of one wire contract
pub trait ProtocolAdapter: Send + Sync {
    /// Envelope kind, for logs
    fn kind(&self) -> &'static str;

    /// Decode a raw request body
    fn decode(&self, body: &[u8]) -> Result<Review, DecodeError>;

    /// Encode a verdict into the response envelope for `review`
    fn encode(&self, verdict: &Verdict, review: Review) -> Result<Vec<u8>, EncodeError>;
}

/// Wire contract served by a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "kebab_case")]
pub enum Protocol {
    /// `admission.k8s.io/v1` AdmissionReview wrapping a Pod
    AdmissionReview,
    /// `imagepolicy.k8s.io/v1alpha1` ImageReview answering `status.allowed`
    ImageReview,
    /// ImageReview answering `status.allowed` and `status.reason`
    ImageReviewWithReason,
}

impl Protocol {
    /// Adapter implementing this contract
    pub fn adapter(self) -> Arc<dyn ProtocolAdapter> {
        match self {
            Protocol::AdmissionReview => Arc::new(AdmissionReviewAdapter),
            Protocol::ImageReview => Arc::new(ImageReviewAdapter::new()),
            Protocol::ImageReviewWithReason => Arc::new(ImageReviewAdapter::with_reason()),
        }
    }

    /// Polarity deployments of this contract have historically used
    pub fn default_polarity(self) -> Polarity {
        match self {
            Protocol::AdmissionReview | Protocol::ImageReview => Polarity::AllowOnlyIfNotContains,
            Protocol::ImageReviewWithReason => Polarity::DenyIfContains,
        }
    }
}
