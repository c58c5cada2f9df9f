//! Admission webhook server.
//!
//! Serves a single path, `/`:
//! - `GET` describes the webhook and the configured substring
//! - `POST` reviews a request envelope and answers with the matching response envelope
//! - any other method is rejected with 405
//!
//! TLS is mandatory. The server starts only once the certificate and key load.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::any};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use tracing::{debug, error, info, warn};

use crate::policy::{PolicyConfig, evaluate};
use crate::webhooks::error::{ReviewError, WebhookError};
use crate::webhooks::protocol::{Protocol, ProtocolAdapter};

/// Default webhook server port
pub const DEFAULT_PORT: u16 = 4443;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 3 * 1024 * 1024;

/// Grace period for in-flight reviews once shutdown starts
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Shared state for webhook handlers.
///
/// Immutable after construction; every request reads it concurrently.
pub struct WebhookState {
    policy: PolicyConfig,
    protocol: Protocol,
    adapter: Arc<dyn ProtocolAdapter>,
    description: String,
}

impl WebhookState {
    pub fn new(policy: PolicyConfig, protocol: Protocol) -> Self {
        let description = format!(
            "This is the Imagine validating admission image policy webhook, checks if the image name contains: {}",
            policy.match_substring()
        );
        Self {
            adapter: protocol.adapter(),
            policy,
            protocol,
            description,
        }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/", any(handle_request))
        .with_state(state)
}

/// Dispatch on method: describe, review, or reject
async fn handle_request(
    State(state): State<Arc<WebhookState>>,
    method: Method,
    uri: Uri,
    body: Body,
) -> Response {
    info!(method = %method, path = %uri.path(), "Received request");

    match method {
        Method::GET => (StatusCode::OK, state.description.clone()).into_response(),
        Method::POST => match review_request(&state, body).await {
            Ok(bytes) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                bytes,
            )
                .into_response(),
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!(
                        method = %method,
                        path = %uri.path(),
                        stage = e.stage(),
                        error = %e,
                        "Failed to answer review"
                    );
                } else {
                    warn!(
                        method = %method,
                        path = %uri.path(),
                        stage = e.stage(),
                        error = %e,
                        "Rejected malformed review"
                    );
                }
                e.into_response()
            }
        },
        _ => {
            debug!(method = %method, "Method not allowed");
            (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
        }
    }
}

/// Read, decode, evaluate and encode one review
async fn review_request(state: &WebhookState, body: Body) -> Result<Bytes, ReviewError> {
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(ReviewError::BodyRead)?;

    info!(body = %String::from_utf8_lossy(&body), "Raw JSON request body");

    let adapter = state.adapter.as_ref();
    let review = adapter.decode(&body)?;
    let verdict = evaluate(&review.images, &state.policy);

    let uid = review.uid.as_deref().unwrap_or_default();
    if verdict.allowed {
        info!(
            kind = adapter.kind(),
            uid = %uid,
            images = ?review.images,
            reason = %verdict.reason,
            "Admission request allowed"
        );
    } else {
        warn!(
            kind = adapter.kind(),
            uid = %uid,
            images = ?review.images,
            reason = %verdict.reason,
            "Admission request denied"
        );
    }

    Ok(Bytes::from(adapter.encode(&verdict, review)?))
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on `port` and serves until `shutdown` resolves, then drains
/// in-flight requests for up to [`SHUTDOWN_GRACE_PERIOD`].
///
/// # Arguments
/// * `state` - Policy and protocol shared by all requests
/// * `cert_path` - Path to TLS certificate chain (PEM format)
/// * `key_path` - Path to TLS private key (PEM format)
/// * `port` - Listen port
/// * `shutdown` - Resolves when the server should stop accepting connections
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    cert_path: &Path,
    key_path: &Path,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), WebhookError> {
    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(WebhookError::TlsConfig)?;

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown.await;
            info!(
                grace_period_secs = SHUTDOWN_GRACE_PERIOD.as_secs(),
                "Shutting down webhook server"
            );
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(WebhookError::Server)?;

    Ok(())
}
