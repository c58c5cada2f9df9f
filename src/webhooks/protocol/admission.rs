//! `admission.k8s.io/v1` AdmissionReview contract.
//!
//! The request carries the Pod under `request.object`. The response is the same
//! envelope with `response: { uid, allowed }` attached; the API server correlates
//! responses by `response.uid`, so it is copied from `request.uid`.
//!
//! Only `request.uid` and `request.object` feed the decision. The rest of the
//! request is logged when present and echoed back untouched.

use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{ProtocolAdapter, Review, parse_envelope};
use crate::policy::Verdict;
use crate::webhooks::error::{DecodeError, EncodeError};

/// Request view of an AdmissionReview
#[derive(Debug, Deserialize)]
struct AdmissionReview {
    #[serde(default)]
    request: Option<AdmissionRequest>,
}

/// The object stays raw until it is parsed as a Pod
#[derive(Debug, Deserialize)]
struct AdmissionRequest {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    object: Option<Value>,
}

/// Adapter for AdmissionReview envelopes wrapping a Pod
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmissionReviewAdapter;

impl ProtocolAdapter for AdmissionReviewAdapter {
    fn kind(&self) -> &'static str {
        "AdmissionReview"
    }

    fn decode(&self, body: &[u8]) -> Result<Review, DecodeError> {
        let envelope = parse_envelope(body)?;
        let review =
            AdmissionReview::deserialize(&envelope).map_err(DecodeError::MalformedEnvelope)?;

        let request = review.request.ok_or(DecodeError::MissingField {
            review: "admission review",
            field: "request",
        })?;

        debug!(
            uid = ?request.uid,
            operation = ?request.operation,
            namespace = ?request.namespace,
            name = ?request.name,
            "Decoded admission request"
        );

        let object = request.object.ok_or(DecodeError::MissingObject)?;
        let pod: Pod = serde_json::from_value(object).map_err(DecodeError::MalformedWorkload)?;

        Ok(Review::new(container_images(pod), request.uid, envelope))
    }

    fn encode(&self, verdict: &Verdict, review: Review) -> Result<Vec<u8>, EncodeError> {
        let response = json!({
            "uid": review.uid.as_deref().unwrap_or_default(),
            "allowed": verdict.allowed,
        });
        review.respond("response", response)
    }
}

/// Images of the Pod's containers, in spec order.
/// A container without an image contributes an empty string.
fn container_images(pod: Pod) -> Vec<String> {
    pod.spec
        .map(|spec| {
            spec.containers
                .into_iter()
                .map(|container| container.image.unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}
