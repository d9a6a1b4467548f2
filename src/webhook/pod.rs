//! Pod Mutation Webhook
//!
//! Handles AdmissionReview requests for Pods, appending the packet-capture
//! sidecar to pods that opt in through the inject annotation.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use json_patch::PatchOperation;
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
    DynamicObject,
};
use tracing::{debug, error, info, warn};

use crate::config::InjectorConfig;
use crate::policy::InjectionPolicy;
use crate::template::{SidecarRenderer, TemplateError};
use crate::workload::{has_image, WorkloadDescriptor};
use crate::{STATUS_ANNOTATION, STATUS_INJECTED};

use super::patch::build_patch_operations;
use super::WebhookState;

/// Verdict for one admission request, before it is bound to the request uid
#[derive(Debug)]
pub enum Decision {
    /// Admit the pod, optionally patching it first
    Allowed {
        /// Ordered patch, absent when the pod passes through unchanged
        patch: Option<Vec<PatchOperation>>,
    },
    /// Reject the pod with a human-readable reason
    Denied {
        /// Why the request was denied
        message: String,
    },
}

impl Decision {
    /// Admit without modification
    pub fn pass_through() -> Self {
        Self::Allowed { patch: None }
    }

    /// Deny with a message
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied {
            message: message.into(),
        }
    }

    /// Whether the pod is admitted
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The patch, if the pod is admitted with one
    pub fn patch(&self) -> Option<&[PatchOperation]> {
        match self {
            Self::Allowed { patch } => patch.as_deref(),
            Self::Denied { .. } => None,
        }
    }

    /// Bind the decision to the request it answers
    ///
    /// The response is derived from the request, so its uid always matches.
    pub fn into_response(self, request: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        let response = AdmissionResponse::from(request);
        match self {
            Self::Allowed { patch: None } => response,
            Self::Allowed { patch: Some(ops) } => {
                match response.with_patch(json_patch::Patch(ops)) {
                    Ok(response) => response,
                    Err(e) => {
                        error!(uid = %request.uid, error = %e, "Failed to serialize patch");
                        AdmissionResponse::from(request)
                            .deny(format!("patch serialization error: {e}"))
                    }
                }
            }
            Self::Denied { message } => response.deny(message),
        }
    }
}

/// Decision orchestrator for pod admission
///
/// Holds only immutable startup configuration, so one instance serves all
/// requests concurrently.
pub struct PodInjector {
    config: Arc<InjectorConfig>,
    renderer: SidecarRenderer,
}

impl PodInjector {
    /// Create an injector over the given startup configuration
    ///
    /// The sidecar template is parsed here, once.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the template does not parse.
    pub fn new(config: Arc<InjectorConfig>) -> Result<Self, TemplateError> {
        let renderer = SidecarRenderer::new(config.template_source.as_str())?;
        Ok(Self { config, renderer })
    }

    /// Decide one admission request and compose the response
    pub fn review(&self, request: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        self.decide(request).into_response(request)
    }

    /// Decide one admission request
    ///
    /// 1. Decode the object as a pod (deny if it is not one)
    /// 2. Evaluate the injection policy (pass through if not required)
    /// 3. Render the sidecar and build the patch (deny on render failure)
    pub fn decide(&self, request: &AdmissionRequest<DynamicObject>) -> Decision {
        let uid = request.uid.as_str();

        debug!(
            uid = %uid,
            kind = %request.kind.kind,
            namespace = ?request.namespace,
            name = %request.name,
            operation = ?request.operation,
            "Received admission request"
        );

        let workload = match WorkloadDescriptor::from_request(request) {
            Ok(workload) => workload,
            Err(e) => {
                error!(uid = %uid, error = %e, "Could not decode admission object");
                return Decision::denied(e.to_string());
            }
        };

        self.decide_workload(uid, &workload)
    }

    /// Decide for an already-decoded workload
    pub fn decide_workload(&self, uid: &str, workload: &WorkloadDescriptor) -> Decision {
        let policy = &self.config.policy;

        if !policy.required(&workload.namespace, &workload.annotations) {
            debug!(
                uid = %uid,
                pod = %workload.name,
                namespace = %workload.namespace,
                "Skipping mutation because of policy check"
            );
            return Decision::pass_through();
        }

        if self.config.skip_injected && InjectionPolicy::already_injected(&workload.annotations) {
            debug!(
                uid = %uid,
                pod = %workload.name,
                namespace = %workload.namespace,
                "Sidecar already injected, allowing unchanged"
            );
            return Decision::pass_through();
        }

        let container = match self
            .renderer
            .render(&workload.annotations, &self.config.sidecar_image)
        {
            Ok(container) => container,
            Err(e) => {
                warn!(
                    uid = %uid,
                    pod = %workload.name,
                    namespace = %workload.namespace,
                    error = %e,
                    "Could not render sidecar, denying"
                );
                return Decision::denied(format!("could not render sidecar: {e}"));
            }
        };

        if !has_image(&container) {
            warn!(
                uid = %uid,
                pod = %workload.name,
                namespace = %workload.namespace,
                "Rendered sidecar has no image, denying"
            );
            return Decision::denied("could not render sidecar: rendered container has no image");
        }

        let annotations =
            BTreeMap::from([(STATUS_ANNOTATION.to_string(), STATUS_INJECTED.to_string())]);

        match build_patch_operations(&container, &annotations) {
            Ok(ops) => {
                info!(
                    uid = %uid,
                    pod = %workload.name,
                    namespace = %workload.namespace,
                    patch_ops = ops.len(),
                    "Injecting packet sniffer sidecar"
                );
                Decision::Allowed { patch: Some(ops) }
            }
            Err(e) => {
                error!(uid = %uid, error = %e, "Failed to build patch");
                Decision::denied(format!("could not build patch: {e}"))
            }
        }
    }
}

/// Handle mutating admission review for Pods
///
/// A body that is not JSON-typed is rejected outright. A JSON body that does
/// not decode as an AdmissionReview is answered with a disallowing review
/// carrying the decode error.
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    payload: Result<Json<AdmissionReview<DynamicObject>>, JsonRejection>,
) -> Result<Json<AdmissionReview<DynamicObject>>, JsonRejection> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection @ JsonRejection::MissingJsonContentType(_)) => return Err(rejection),
        Err(rejection) => {
            error!(error = %rejection.body_text(), "Could not deserialize admission review");
            return Ok(Json(
                AdmissionResponse::invalid(rejection.body_text()).into_review(),
            ));
        }
    };

    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Ok(Json(AdmissionResponse::invalid(e.to_string()).into_review()));
        }
    };

    let response = state.injector.review(&req);
    Ok(Json(response.into_review()))
}
