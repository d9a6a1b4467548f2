//! Error types for the sniffer injector

use thiserror::Error;

use crate::template::TemplateError;

/// Main error type for injector startup and serving
///
/// Per-request failures never surface here: they are folded into a denied
/// admission response by [`crate::webhook::pod`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid startup configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Sidecar template could not be loaded or validated
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Filesystem error while reading startup inputs
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server failure
    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a server error with the given message
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Startup Failures
    // ==========================================================================

    /// Story: a missing sidecar image is reported as a configuration problem
    #[test]
    fn story_config_errors_name_the_problem() {
        let err = Error::config("sidecar image must not be empty");
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("sidecar image"));

        match Error::config("any message") {
            Error::Config(msg) => assert_eq!(msg, "any message"),
            _ => panic!("Expected Config variant"),
        }
    }

    /// Story: an unreadable template file surfaces the underlying io error
    #[test]
    fn story_io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("no such file"));
    }

    /// Story: a broken template fails the boot with the template's message
    #[test]
    fn story_template_errors_convert() {
        let yaml = serde_yaml::from_str::<serde_yaml::Value>("image: [unclosed").unwrap_err();
        let err: Error = TemplateError::from(yaml).into();
        assert!(matches!(err, Error::Template(TemplateError::Decode(_))));
        assert!(err.to_string().starts_with("template error:"));
    }

    #[test]
    fn test_error_construction_ergonomics() {
        let port = 8443;
        let err = Error::server(format!("failed to bind port {}", port));
        assert!(err.to_string().contains("8443"));
    }
}
