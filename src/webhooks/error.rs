//! Error types for the webhook.
//!
//! Per-request errors ([`ReviewError`]) are answered at the HTTP boundary and never
//! leave the handler. Only [`WebhookError`] stops the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure turning a request body into a review
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Body is not JSON, or not JSON of the expected envelope shape
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// Envelope parsed but a required top-level field is absent
    #[error("invalid {review} request: missing `{field}`")]
    MissingField {
        review: &'static str,
        field: &'static str,
    },

    /// Admission request carries no object to review
    #[error("admission request has no `object`")]
    MissingObject,

    /// Embedded object is not a Pod
    #[error("malformed workload: {0}")]
    MalformedWorkload(#[source] serde_json::Error),
}

impl DecodeError {
    /// Decode stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            DecodeError::MalformedEnvelope(_) | DecodeError::MissingField { .. } => "envelope",
            DecodeError::MissingObject | DecodeError::MalformedWorkload(_) => "workload",
        }
    }

    /// Message returned to the client
    fn client_message(&self) -> String {
        match self {
            DecodeError::MalformedEnvelope(_) => "could not decode request body".to_string(),
            DecodeError::MissingField { review, .. } => format!("invalid {} request", review),
            DecodeError::MissingObject | DecodeError::MalformedWorkload(_) => {
                "could not decode pod spec".to_string()
            }
        }
    }
}

/// Failure serializing a response envelope
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Echoed envelope is not a JSON object, so no response field can be attached
    #[error("response envelope is not a JSON object")]
    NotAnObject,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error answering a single review request
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Transport failure (or size limit) while reading the body
    #[error("could not read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ReviewError {
    /// Stage of the request pipeline that failed
    pub fn stage(&self) -> &'static str {
        match self {
            ReviewError::BodyRead(_) => "body",
            ReviewError::Decode(e) => e.stage(),
            ReviewError::Encode(_) => "encode",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::BodyRead(_) | ReviewError::Decode(_) => StatusCode::BAD_REQUEST,
            ReviewError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            ReviewError::BodyRead(_) => "could not read request body".to_string(),
            ReviewError::Decode(e) => e.client_message(),
            ReviewError::Encode(_) => "could not encode response".to_string(),
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        (self.status_code(), self.client_message()).into_response()
    }
}

/// Errors that stop the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Certificate or key missing, unreadable or invalid
    #[error("TLS configuration error: {0}")]
    TlsConfig(#[source] std::io::Error),

    /// Listener bind or accept loop failure
    #[error("webhook server error: {0}")]
    Server(#[source] std::io::Error),
}
