//! Shared fixtures: router construction, request helpers and envelope builders.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use imagine_webhook::{Polarity, PolicyConfig, Protocol, WebhookState, create_webhook_router};

/// Correlation id used by [`admission_review`]
pub const REQUEST_UID: &str = "0df28fbd-5f5f-11e8-bc74-36e6bb280816";

/// Response captured from the router
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Router for `protocol` with its customary polarity
pub fn router(protocol: Protocol, image_name: &str) -> Router {
    router_with_polarity(protocol, image_name, protocol.default_polarity())
}

pub fn router_with_polarity(protocol: Protocol, image_name: &str, polarity: Polarity) -> Router {
    let state = WebhookState::new(PolicyConfig::new(image_name, polarity), protocol);
    create_webhook_router(Arc::new(state))
}

/// Send one request to `/` and collect the response
pub async fn send(router: Router, method: Method, body: impl Into<Body>) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        content_type,
        body,
    }
}

/// POST a JSON envelope
pub async fn post_json(router: Router, envelope: &Value) -> TestResponse {
    send(router, Method::POST, serde_json::to_vec(envelope).unwrap()).await
}

/// Pod manifest with one container per image
pub fn pod(images: &[&str]) -> Value {
    let containers: Vec<Value> = images
        .iter()
        .enumerate()
        .map(|(i, image)| json!({"name": format!("container-{}", i), "image": image}))
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": "web", "namespace": "default", "labels": {"app": "web"}},
        "spec": {"containers": containers}
    })
}

/// AdmissionReview for a CREATE of `object`
pub fn admission_review(object: Value) -> Value {
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": REQUEST_UID,
            "kind": {"group": "", "version": "v1", "kind": "Pod"},
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "requestKind": {"group": "", "version": "v1", "kind": "Pod"},
            "requestResource": {"group": "", "version": "v1", "resource": "pods"},
            "name": "web",
            "namespace": "default",
            "operation": "CREATE",
            "userInfo": {
                "username": "system:serviceaccount:kube-system:replicaset-controller",
                "groups": ["system:serviceaccounts"]
            },
            "object": object,
            "oldObject": null,
            "dryRun": false
        }
    })
}

/// ImageReview listing `images`
pub fn image_review(images: &[&str]) -> Value {
    let containers: Vec<Value> = images.iter().map(|image| json!({"image": image})).collect();
    json!({
        "apiVersion": "imagepolicy.k8s.io/v1alpha1",
        "kind": "ImageReview",
        "spec": {
            "containers": containers,
            "annotations": {"mycluster.image-policy.k8s.io/ticket-1234": "break-glass"},
            "namespace": "mynamespace"
        }
    })
}
