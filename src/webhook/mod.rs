//! Mutating Admission Webhook for packet-sniffer injection
//!
//! This module exposes the HTTP surface of the injector. The API server posts
//! an AdmissionReview for every pod creation matched by the webhook
//! configuration; the handler answers with the same review carrying the
//! admission decision and, for opted-in pods, a JSON patch.
//!
//! The decision itself is synchronous and stateless: see [`pod::PodInjector`].

pub mod patch;
pub mod pod;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::InjectorConfig;
use crate::template::TemplateError;
use pod::PodInjector;

/// Shared state for webhook handlers
pub struct WebhookState {
    /// Decision orchestrator built from the startup configuration
    pub injector: PodInjector,
}

impl WebhookState {
    /// Create a new webhook state over the given startup configuration
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the sidecar template does not parse.
    pub fn new(config: Arc<InjectorConfig>) -> Result<Self, TemplateError> {
        Ok(Self {
            injector: PodInjector::new(config)?,
        })
    }
}

/// Create the webhook router
///
/// - POST /mutate - Mutate Pods with the packet-sniffer sidecar
/// - GET /healthz - Liveness check
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/mutate", post(pod::mutate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::INJECT_ANNOTATION;

    const TEMPLATE: &str = "name: packet-sniffer\nimage: {{ image | quote }}\n";

    fn test_router() -> Router {
        let config = InjectorConfig::new("sniffer:latest", TEMPLATE);
        let state = WebhookState::new(Arc::new(config)).expect("template should parse");
        webhook_router(Arc::new(state))
    }

    fn review_body(namespace: &str, inject: &str) -> String {
        serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "0df28fbd-5f5f-11e8-bc74-36e6bb280816",
                "kind": { "group": "", "version": "v1", "kind": "Pod" },
                "resource": { "group": "", "version": "v1", "resource": "pods" },
                "operation": "CREATE",
                "namespace": namespace,
                "name": "web",
                "userInfo": { "username": "admin" },
                "dryRun": false,
                "object": {
                    "apiVersion": "v1",
                    "kind": "Pod",
                    "metadata": { "name": "web", "annotations": { INJECT_ANNOTATION: inject } },
                    "spec": { "containers": [{ "name": "app", "image": "nginx" }] }
                }
            }
        })
        .to_string()
    }

    async fn post_review(router: Router, body: String) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/mutate")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    #[tokio::test]
    async fn integration_healthz() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn integration_mutate_opted_in_pod() {
        let (status, review) = post_review(test_router(), review_body("default", "true")).await;
        assert_eq!(status, StatusCode::OK);

        let response = &review["response"];
        assert_eq!(response["uid"], "0df28fbd-5f5f-11e8-bc74-36e6bb280816");
        assert_eq!(response["allowed"], true);
        assert_eq!(response["patchType"], "JSONPatch");
        assert!(!response["patch"].is_null());
    }

    #[tokio::test]
    async fn integration_mutate_excluded_namespace() {
        let (status, review) =
            post_review(test_router(), review_body("kube-system", "true")).await;
        assert_eq!(status, StatusCode::OK);

        let response = &review["response"];
        assert_eq!(response["uid"], "0df28fbd-5f5f-11e8-bc74-36e6bb280816");
        assert_eq!(response["allowed"], true);
        assert!(response["patch"].is_null());
    }

    #[tokio::test]
    async fn integration_mutate_rejects_wrong_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/mutate")
            .header("content-type", "text/plain")
            .body(Body::from(review_body("default", "true")))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn integration_mutate_answers_garbage_body_with_denial() {
        let (status, review) = post_review(test_router(), "{not json".to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(review["response"]["allowed"], false);
    }

    #[tokio::test]
    async fn integration_mutate_answers_wrong_shape_with_denial() {
        let body = serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": { "uid": 42 }
        })
        .to_string();

        let (status, review) = post_review(test_router(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(review["response"]["allowed"], false);
    }

    #[tokio::test]
    async fn integration_review_without_request_is_invalid() {
        let body = serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview"
        })
        .to_string();

        let (status, review) = post_review(test_router(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(review["response"]["allowed"], false);
    }
}
