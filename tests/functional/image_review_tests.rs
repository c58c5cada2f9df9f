//! ImageReview envelopes end to end.

use axum::http::StatusCode;
use serde_json::json;

use imagine_webhook::{Polarity, Protocol};

use crate::{image_review, post_json, router, router_with_polarity};

#[tokio::test]
async fn test_image_review_denies_when_every_image_matches() {
    let response = post_json(
        router_with_polarity(
            Protocol::ImageReview,
            "nginx",
            Polarity::AllowOnlyIfNotContains,
        ),
        &image_review(&["nginx:1.0"]),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.json()["status"], json!({"allowed": false}));
}

#[tokio::test]
async fn test_image_review_omits_reason() {
    let response = post_json(
        router(Protocol::ImageReview, "nginx"),
        &image_review(&["redis:7"]),
    )
    .await;

    let body = response.json();
    assert_eq!(body["status"]["allowed"], true);
    assert!(body["status"].get("reason").is_none());
}

#[tokio::test]
async fn test_image_review_with_reason_allows_safe_image() {
    let response = post_json(
        router(Protocol::ImageReviewWithReason, "bad"),
        &image_review(&["safe-image:1.0"]),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["status"],
        json!({"allowed": true, "reason": "Image name is allowed"})
    );
}

#[tokio::test]
async fn test_image_review_with_reason_denies_on_first_match() {
    let response = post_json(
        router(Protocol::ImageReviewWithReason, "bad"),
        &image_review(&["safe-image:1.0", "bad-image:2.0"]),
    )
    .await;

    assert_eq!(
        response.json()["status"],
        json!({
            "allowed": false,
            "reason": "image name contains disallowed string: bad"
        })
    );
}

#[tokio::test]
async fn test_image_review_with_reason_allows_empty_container_list() {
    let response = post_json(
        router(Protocol::ImageReviewWithReason, "bad"),
        &image_review(&[]),
    )
    .await;

    assert_eq!(response.json()["status"]["allowed"], true);
}

#[tokio::test]
async fn test_image_review_echoes_spec() {
    let request = image_review(&["safe-image:1.0"]);
    let response = post_json(router(Protocol::ImageReviewWithReason, "bad"), &request).await;

    let body = response.json();
    assert_eq!(body["apiVersion"], "imagepolicy.k8s.io/v1alpha1");
    assert_eq!(body["kind"], "ImageReview");
    assert_eq!(body["spec"], request["spec"]);
}

#[tokio::test]
async fn test_image_review_without_spec_is_rejected() {
    let envelope = json!({"apiVersion": "imagepolicy.k8s.io/v1alpha1", "kind": "ImageReview"});
    let response = post_json(router(Protocol::ImageReview, "bad"), &envelope).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid image review request");
}
