//! Sidecar templating
//!
//! The sidecar container is described by a Jinja-style template supplied at
//! startup. Each admission request renders it against a [`SidecarConfig`]
//! built from the startup image and the pod's annotations, and decodes the
//! expanded YAML into a container spec.
//!
//! # Template variables
//!
//! - `{{ image }}` - Sidecar image
//! - `{{ network_interface }}` - Capture interface (`eth0` unless overridden)
//! - `{{ bpf_expr }}` - Capture filter (`tcp and dst port 80` unless overridden)
//! - `{{ output }}` - Capture sink (`stdout`)
//! - `{{ log_level }}` - Sidecar log level (`info`)
//!
//! # Filters
//!
//! - `quote` - Emit a YAML-safe double-quoted string
//! - `required` - Fail on missing or blank values

mod context;
mod engine;
mod error;
mod filters;
mod renderer;

pub use context::{SidecarConfig, SIDECAR_LOG_LEVEL, SIDECAR_OUTPUT};
pub use engine::TemplateEngine;
pub use error::TemplateError;
pub use renderer::SidecarRenderer;
