//! Sidecar Renderer
//!
//! High-level API for turning the sidecar template into a container spec.
//! Resolves per-pod overrides, expands the template, and decodes the result.

use std::collections::BTreeMap;

use tracing::debug;

use crate::workload::ContainerSpec;

use super::context::SidecarConfig;
use super::engine::TemplateEngine;
use super::error::TemplateError;

/// Renders sidecar container specs from a parsed template
pub struct SidecarRenderer {
    engine: TemplateEngine,
}

impl SidecarRenderer {
    /// Create a renderer over the given template source
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the source does not parse.
    pub fn new(template_source: impl Into<String>) -> Result<Self, TemplateError> {
        Ok(Self {
            engine: TemplateEngine::new(template_source)?,
        })
    }

    /// Render the sidecar for a pod with the given annotations
    ///
    /// The network interface and BPF expression come from the annotations when
    /// present and from the defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the template references an undefined field or
    /// expands to text that is not a container spec.
    pub fn render(
        &self,
        annotations: &BTreeMap<String, String>,
        base_image: &str,
    ) -> Result<ContainerSpec, TemplateError> {
        let config = SidecarConfig::from_annotations(base_image, annotations);
        self.render_config(&config)
    }

    /// Render the sidecar for an already-resolved config
    pub fn render_config(&self, config: &SidecarConfig) -> Result<ContainerSpec, TemplateError> {
        let expanded = self.engine.render(config)?;
        debug!(bytes = expanded.len(), "expanded sidecar template");

        let container: ContainerSpec = serde_yaml::from_str(&expanded)?;
        Ok(container)
    }
}
