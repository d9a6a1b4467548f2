//! Template error types

use thiserror::Error;

/// Errors that can occur while turning the sidecar template into a container
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template source could not be parsed
    #[error("template syntax error: {0}")]
    Syntax(#[source] minijinja::Error),

    /// Expansion failed, typically because a referenced field is undefined
    #[error("template render error: {0}")]
    Render(#[source] minijinja::Error),

    /// Expanded text is not a valid container specification
    #[error("rendered sidecar is not a valid container spec: {0}")]
    Decode(#[from] serde_yaml::Error),
}
