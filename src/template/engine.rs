//! Template engine for sidecar container templates
//!
//! Uses minijinja with its default Jinja delimiters:
//! - Variables: `{{ image }}`, `{{ bpf_expr | quote }}`
//! - Blocks: `{% if ... %}...{% endif %}`
//! - Comments: `{# ... #}`
//!
//! Undefined variables are errors, so a template referencing a field the
//! [`SidecarConfig`] does not carry fails loudly instead of rendering blank.

use minijinja::{Environment, UndefinedBehavior};

use super::context::SidecarConfig;
use super::error::TemplateError;
use super::filters;

/// Name the sidecar template is registered under
///
/// Carries no file extension so minijinja applies no auto-escaping.
const SIDECAR_TEMPLATE: &str = "sidecar";

/// Template engine holding the parsed sidecar template
///
/// The source is parsed once on construction; every render reuses it.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Parse a sidecar template source
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the source does not parse. Undefined
    /// variables are only detected at render time.
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        env.add_filter("quote", filters::quote);
        env.add_filter("required", filters::required);

        env.add_template_owned(SIDECAR_TEMPLATE, source.into())
            .map_err(TemplateError::Syntax)?;

        Ok(Self { env })
    }

    /// Expand the sidecar template against a sidecar config
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if a referenced field is undefined or a
    /// filter fails.
    pub fn render(&self, config: &SidecarConfig) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(SIDECAR_TEMPLATE)
            .map_err(TemplateError::Render)?;

        template.render(config).map_err(TemplateError::Render)
    }
}
