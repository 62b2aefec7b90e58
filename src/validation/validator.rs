//! Schema validator.

use serde::{Deserialize, Serialize};

use super::error::{ValidationFailure, ValidationResult};
use crate::types::tool::value_kind;
use crate::types::{Parameters, ToolSchema};

/// Policy for parameters that are supplied but not declared by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownParameters {
    /// Accept and ignore them, so older callers keep working against newer schemas.
    #[default]
    Ignore,
    /// Reject the request with `TYPE_MISMATCH`.
    Reject,
}

/// Validator bound to an unknown-parameter policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    unknown: UnknownParameters,
}

impl SchemaValidator {
    pub fn new(unknown: UnknownParameters) -> Self {
        Self { unknown }
    }

    /// Validator that rejects undeclared parameters.
    pub fn strict() -> Self {
        Self::new(UnknownParameters::Reject)
    }

    pub fn unknown_parameters(&self) -> UnknownParameters {
        self.unknown
    }

    /// Validate `parameters` against `schema`, reporting the first failure.
    pub fn validate(&self, schema: &ToolSchema, parameters: &Parameters) -> ValidationResult {
        // Presence first, so a missing parameter is never reported as a type problem.
        for (name, spec) in schema.parameters.iter() {
            if spec.required && !parameters.contains_key(name) {
                return Err(ValidationFailure::missing(name));
            }
        }

        for (name, spec) in schema.parameters.iter() {
            if let Some(value) = parameters.get(name) {
                if !spec.param_type.matches(value) {
                    return Err(ValidationFailure::mismatch(
                        name,
                        spec.param_type.as_str(),
                        value_kind(value),
                    ));
                }
            }
        }

        if self.unknown == UnknownParameters::Reject {
            if let Some(name) = parameters
                .keys()
                .find(|name| !schema.parameters.contains(name))
            {
                return Err(ValidationFailure::undeclared(name));
            }
        }

        Ok(())
    }
}

/// Validate with the default (forward-compatible) policy.
pub fn validate(schema: &ToolSchema, parameters: &Parameters) -> ValidationResult {
    SchemaValidator::default().validate(schema, parameters)
}
