//! Startup configuration
//!
//! Flags are parsed with clap and each one can also come from the environment,
//! so the same binary runs from a shell or from a Deployment manifest. The
//! parsed [`Args`] are turned once into an immutable [`InjectorConfig`] that
//! every admission request reads from.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;

use crate::policy::InjectionPolicy;
use crate::{Error, DEFAULT_WEBHOOK_PORT, NAMESPACE_SYSTEM};

/// Default location of the sidecar template, relative to the working directory
pub const DEFAULT_TEMPLATE_PATH: &str = "./templates/sidecar-container.yaml.j2";

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable lines
    Text,
}

/// Sniffer injector - mutating admission webhook for packet-capture sidecars
#[derive(Parser, Debug)]
#[command(name = "sniffer-injector", version, about, long_about = None)]
pub struct Args {
    /// HTTPS port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_WEBHOOK_PORT)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Server certificate, PEM encoded
    #[arg(long, env = "CERT_FILE", hide_env_values = true)]
    pub tls_cert: String,

    /// Server private key, PEM encoded
    #[arg(long, env = "CERT_KEY", hide_env_values = true)]
    pub tls_key: String,

    /// Path to the sidecar container template
    #[arg(long, env = "SIDE_CAR_TEMPLATE_FILE", default_value = DEFAULT_TEMPLATE_PATH)]
    pub sidecar_template: PathBuf,

    /// Container image for the injected sidecar
    #[arg(long, env = "SIDECAR_CONTAINER_IMAGE")]
    pub sidecar_image: String,

    /// Namespaces whose pods are never mutated
    #[arg(
        long,
        env = "EXCLUDED_NAMESPACES",
        value_delimiter = ',',
        default_value = NAMESPACE_SYSTEM
    )]
    pub excluded_namespaces: Vec<String>,

    /// Leave pods that already carry the injected status annotation unchanged
    #[arg(long, env = "SKIP_INJECTED")]
    pub skip_injected: bool,
}

impl Args {
    /// Load the template and build the injector configuration
    ///
    /// The template text is only read here. It is parsed once when the
    /// [`crate::webhook::WebhookState`] is built.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the sidecar image is empty
    /// - [`Error::Io`] if the template file cannot be read
    pub fn into_injector_config(self) -> crate::Result<InjectorConfig> {
        let image = self.sidecar_image.trim();
        if image.is_empty() {
            return Err(Error::config("sidecar image must not be empty"));
        }

        let template_source = std::fs::read_to_string(&self.sidecar_template)?;

        info!(
            template = %self.sidecar_template.display(),
            image = %image,
            "Loaded sidecar template"
        );

        let namespaces = self
            .excluded_namespaces
            .iter()
            .map(|ns| ns.trim())
            .filter(|ns| !ns.is_empty());

        Ok(InjectorConfig::new(image, template_source)
            .with_policy(InjectionPolicy::new(namespaces))
            .with_skip_injected(self.skip_injected))
    }
}

/// Immutable configuration shared by every admission request
#[derive(Clone, Debug)]
pub struct InjectorConfig {
    /// Image the rendered sidecar runs
    pub sidecar_image: String,
    /// Raw template text, loaded once at startup
    pub template_source: String,
    /// Namespace and annotation policy
    pub policy: InjectionPolicy,
    /// Pass through pods whose status annotation already reads `injected`
    pub skip_injected: bool,
}

impl InjectorConfig {
    /// Create a configuration with the default policy
    pub fn new(sidecar_image: impl Into<String>, template_source: impl Into<String>) -> Self {
        Self {
            sidecar_image: sidecar_image.into(),
            template_source: template_source.into(),
            policy: InjectionPolicy::default(),
            skip_injected: false,
        }
    }

    /// Replace the injection policy
    pub fn with_policy(mut self, policy: InjectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set whether already-injected pods pass through
    pub fn with_skip_injected(mut self, skip_injected: bool) -> Self {
        self.skip_injected = skip_injected;
        self
    }
}
