//! Sidecar template context
//!
//! [`SidecarConfig`] is the full parameter set a sidecar template can reference:
//! - `{{ image }}` - Sidecar image, from startup configuration
//! - `{{ network_interface }}` - Capture interface, overridable per pod
//! - `{{ bpf_expr }}` - Capture filter, overridable per pod
//! - `{{ output }}` - Capture sink, fixed
//! - `{{ log_level }}` - Sidecar log level, fixed

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::{
    BPF_EXPR_ANNOTATION, DEFAULT_BPF_EXPR, DEFAULT_NETWORK_INTERFACE,
    NETWORK_INTERFACE_ANNOTATION,
};

/// Capture sink passed to every sidecar
pub const SIDECAR_OUTPUT: &str = "stdout";

/// Log level passed to every sidecar
pub const SIDECAR_LOG_LEVEL: &str = "info";

/// Parameters fed to the sidecar template, built fresh for every request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidecarConfig {
    /// Sidecar container image
    pub image: String,
    /// BPF filter expression for the capture
    pub bpf_expr: String,
    /// Network interface to capture on
    pub network_interface: String,
    /// Where captured traffic is written
    pub output: String,
    /// Sidecar log level
    pub log_level: String,
}

impl SidecarConfig {
    /// Create a config with the default interface and filter
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            bpf_expr: DEFAULT_BPF_EXPR.to_string(),
            network_interface: DEFAULT_NETWORK_INTERFACE.to_string(),
            output: SIDECAR_OUTPUT.to_string(),
            log_level: SIDECAR_LOG_LEVEL.to_string(),
        }
    }

    /// Resolve per-pod overrides from annotations, falling back to defaults
    ///
    /// A missing override is not an error; it only selects the default.
    pub fn from_annotations(image: impl Into<String>, annotations: &BTreeMap<String, String>) -> Self {
        let mut config = Self::new(image);

        match annotations.get(NETWORK_INTERFACE_ANNOTATION) {
            Some(interface) => config.network_interface = interface.clone(),
            None => info!(
                annotation = NETWORK_INTERFACE_ANNOTATION,
                default = DEFAULT_NETWORK_INTERFACE,
                "annotation missing, using default network interface"
            ),
        }

        match annotations.get(BPF_EXPR_ANNOTATION) {
            Some(expr) => config.bpf_expr = expr.clone(),
            None => info!(
                annotation = BPF_EXPR_ANNOTATION,
                default = DEFAULT_BPF_EXPR,
                "annotation missing, using default bpf expression"
            ),
        }

        config
    }

    /// Override the BPF filter expression
    pub fn with_bpf_expr(mut self, expr: impl Into<String>) -> Self {
        self.bpf_expr = expr.into();
        self
    }

    /// Override the network interface
    pub fn with_network_interface(mut self, interface: impl Into<String>) -> Self {
        self.network_interface = interface.into();
        self
    }
}
