//! Workload descriptors for admission review
//!
//! The webhook only needs a narrow view of the object under review: its name,
//! namespace, annotations, and container list. This module decodes that view
//! from an admission request and rejects anything that is not a Pod.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, Pod};
use kube::core::admission::AdmissionRequest;
use kube::core::DynamicObject;
use thiserror::Error;

/// Container specification carried opaquely through rendering and patching
pub type ContainerSpec = Container;

/// The only workload kind the webhook mutates
pub const POD_KIND: &str = "Pod";

/// Reasons an admission request cannot be decoded into a [`WorkloadDescriptor`]
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The request targets a kind other than Pod
    #[error("unsupported kind {0:?}: only Pod is supported")]
    UnsupportedKind(String),

    /// The request carries no object (e.g. a DELETE)
    #[error("admission request for {0} carries no object")]
    MissingObject(String),

    /// The object does not parse as a Pod
    #[error("could not parse the raw object as a pod: {0}")]
    InvalidObject(#[from] serde_json::Error),
}

/// Minimal view of a pod needed for an injection decision
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkloadDescriptor {
    /// Pod name (falls back to `generateName` for pods named by the server)
    pub name: String,
    /// Namespace the pod is created in
    pub namespace: String,
    /// Pod annotations; absent annotations decode as an empty map
    pub annotations: BTreeMap<String, String>,
    /// Containers in declaration order
    pub containers: Vec<ContainerSpec>,
}

impl WorkloadDescriptor {
    /// Build a descriptor from a decoded pod
    ///
    /// `request_namespace` wins over the pod's own namespace, since the API
    /// server fills it in even when the submitted manifest omits it.
    pub fn from_pod(pod: Pod, request_namespace: Option<&str>) -> Self {
        let meta = pod.metadata;
        let name = meta
            .name
            .filter(|n| !n.is_empty())
            .or(meta.generate_name)
            .unwrap_or_default();
        let namespace = request_namespace
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .or(meta.namespace)
            .unwrap_or_default();

        Self {
            name,
            namespace,
            annotations: meta.annotations.unwrap_or_default(),
            containers: pod.spec.map(|spec| spec.containers).unwrap_or_default(),
        }
    }

    /// Decode the object of an admission request
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnsupportedKind`] unless the request kind is `Pod`
    /// - [`DecodeError::MissingObject`] if the request has no object
    /// - [`DecodeError::InvalidObject`] if the object does not parse as a Pod
    pub fn from_request(request: &AdmissionRequest<DynamicObject>) -> Result<Self, DecodeError> {
        if request.kind.kind != POD_KIND {
            return Err(DecodeError::UnsupportedKind(request.kind.kind.clone()));
        }

        let object = request
            .object
            .as_ref()
            .ok_or_else(|| DecodeError::MissingObject(request.kind.kind.clone()))?;

        let pod: Pod = serde_json::from_value(serde_json::to_value(object)?)?;
        Ok(Self::from_pod(pod, request.namespace.as_deref()))
    }
}

/// Whether a container has a populated image, i.e. is worth injecting
pub fn has_image(container: &ContainerSpec) -> bool {
    container
        .image
        .as_deref()
        .is_some_and(|image| !image.is_empty())
}
