//! `imagepolicy.k8s.io/v1alpha1` ImageReview contract.
//!
//! The request lists containers under `spec.containers[].image`; the response is
//! the same envelope with `status` attached. The plain contract answers
//! `status.allowed` only; the newer one also carries `status.reason`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProtocolAdapter, Review, parse_envelope};
use crate::policy::Verdict;
use crate::webhooks::error::{DecodeError, EncodeError};

/// Request view of an ImageReview; everything else in the envelope is echoed untouched
#[derive(Debug, Deserialize)]
struct ImageReview {
    spec: Option<ImageReviewSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageReviewSpec {
    #[serde(default)]
    containers: Option<Vec<ImageReviewContainerSpec>>,
    #[serde(default)]
    annotations: Option<BTreeMap<String, String>>,
    #[serde(default)]
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageReviewContainerSpec {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageReviewStatus<'a> {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Adapter for ImageReview envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageReviewAdapter {
    with_reason: bool,
}

impl ImageReviewAdapter {
    /// Answers `status.allowed` only
    pub fn new() -> Self {
        Self { with_reason: false }
    }

    /// Answers `status.allowed` and `status.reason`
    pub fn with_reason() -> Self {
        Self { with_reason: true }
    }
}

impl ProtocolAdapter for ImageReviewAdapter {
    fn kind(&self) -> &'static str {
        "ImageReview"
    }

    fn decode(&self, body: &[u8]) -> Result<Review, DecodeError> {
        let envelope = parse_envelope(body)?;
        let review =
            ImageReview::deserialize(&envelope).map_err(DecodeError::MalformedEnvelope)?;

        let spec = review.spec.ok_or(DecodeError::MissingField {
            review: "image review",
            field: "spec",
        })?;

        debug!(
            namespace = ?spec.namespace,
            annotations = spec.annotations.as_ref().map_or(0, BTreeMap::len),
            "Decoded image review"
        );

        let images = spec
            .containers
            .unwrap_or_default()
            .into_iter()
            .map(|container| container.image.unwrap_or_default())
            .collect();

        Ok(Review::new(images, None, envelope))
    }

    fn encode(&self, verdict: &Verdict, review: Review) -> Result<Vec<u8>, EncodeError> {
        let status = ImageReviewStatus {
            allowed: verdict.allowed,
            reason: self.with_reason.then_some(verdict.reason.as_str()),
        };
        review.respond("status", serde_json::to_value(status)?)
    }
}
