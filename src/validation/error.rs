//! Validation failure type.

use std::fmt;

use crate::error_code::GatewayErrorCode;

/// A single validation failure, mapped directly onto an error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// `MISSING_PARAMETER` or `TYPE_MISMATCH`
    pub code: GatewayErrorCode,
    /// Name of the offending parameter
    pub parameter: String,
    /// Caller-facing description
    pub message: String,
}

impl ValidationFailure {
    pub fn missing(parameter: &str) -> Self {
        Self {
            code: GatewayErrorCode::MissingParameter,
            parameter: parameter.to_string(),
            message: format!("Missing required parameter '{}'", parameter),
        }
    }

    pub fn mismatch(parameter: &str, expected: &str, actual: &str) -> Self {
        Self {
            code: GatewayErrorCode::TypeMismatch,
            parameter: parameter.to_string(),
            message: format!(
                "Parameter '{}' expected type {}, got {}",
                parameter, expected, actual
            ),
        }
    }

    pub fn undeclared(parameter: &str) -> Self {
        Self {
            code: GatewayErrorCode::TypeMismatch,
            parameter: parameter.to_string(),
            message: format!("Parameter '{}' is not declared by the tool schema", parameter),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationFailure {}

/// Outcome of validating one parameter set.
pub type ValidationResult = std::result::Result<(), ValidationFailure>;
