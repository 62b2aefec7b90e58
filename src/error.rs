use crate::registry::RegistryError;
use crate::transport::TransportError;
use thiserror::Error;

/// Where a startup or comparison error came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Config key or option that was rejected (e.g. "compare.concurrency")
    pub field_path: Option<String>,
    /// Offending value or expectation
    pub details: Option<String>,
    /// Component that raised the error (e.g. "config_loader")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn suffix(&self) -> String {
        let parts: Vec<String> = [
            ("field", &self.field_path),
            ("details", &self.details),
            ("source", &self.source),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect();

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

/// Gateway error type.
///
/// Dispatch itself never returns this type: every dispatch path ends in an envelope.
/// It covers startup (registration, configuration) and the comparison client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {message}{}", .context.suffix())]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", .context.suffix())]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered_in_display() {
        let err = Error::configuration_with_context(
            "concurrency must be at least 1",
            ErrorContext::new()
                .with_field_path("compare.concurrency")
                .with_source("config_loader"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: concurrency must be at least 1 (field: compare.concurrency, source: config_loader)"
        );
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("compare.concurrency")
        );
    }

    #[test]
    fn test_empty_context_renders_no_suffix() {
        let err = Error::validation_with_context("workload is empty", ErrorContext::default());
        assert_eq!(err.to_string(), "Validation error: workload is empty");
    }
}
