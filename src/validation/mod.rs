//! 参数校验模块：按工具声明的参数规格校验调用参数。
//!
//! # Parameter Validation
//!
//! Checks the parameters of an incoming request against the [`ToolSchema`] of the
//! named tool before the handler is invoked.
//!
//! Rules, applied in schema declaration order:
//! 1. every parameter declared `required` must be present, otherwise `MISSING_PARAMETER`;
//! 2. every supplied parameter that is declared must match its [`ParamType`] tag,
//!    otherwise `TYPE_MISMATCH`;
//! 3. supplied parameters that are not declared are ignored under
//!    [`UnknownParameters::Ignore`] (the default) and rejected with `TYPE_MISMATCH`
//!    under [`UnknownParameters::Reject`].
//!
//! Validation is a pure function of the schema, the parameters and the policy.
//!
//! ```rust
//! use mcp_gateway::types::{ParamSpec, ParamType, ToolCategory, ToolSchema};
//! use mcp_gateway::validation::validate;
//! use mcp_gateway::error_code::GatewayErrorCode;
//!
//! let schema = ToolSchema::new("search", ToolCategory::Search)
//!     .with_parameter("query", ParamSpec::required(ParamType::String));
//! let params = serde_json::Map::new();
//! let failure = validate(&schema, &params).unwrap_err();
//! assert_eq!(failure.code, GatewayErrorCode::MissingParameter);
//! ```
//!
//! [`ToolSchema`]: crate::types::ToolSchema
//! [`ParamType`]: crate::types::ParamType

mod error;
mod validator;

pub use error::{ValidationFailure, ValidationResult};
pub use validator::{validate, SchemaValidator, UnknownParameters};
