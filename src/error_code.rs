//! 网关错误码：信封中使用的封闭错误码集合及其分类语义。
//!
//! Gateway error codes.
//!
//! Every error envelope produced by the gateway carries exactly one of these codes.
//! The set is closed: transports and callers can match on the string form without
//! a catch-all branch.
//!
//! ## Error Code Categories
//!
//! | Code                | Category  | Raised by                    |
//! |---------------------|-----------|------------------------------|
//! | `TOOL_NOT_FOUND`    | client    | registry lookup              |
//! | `MISSING_PARAMETER` | client    | schema validator             |
//! | `TYPE_MISMATCH`     | client    | schema validator             |
//! | `DUPLICATE_TOOL`    | client    | registration (startup only)  |
//! | `EXECUTION_ERROR`   | execution | dispatcher catch-all         |
//! | `TIMEOUT`           | transport | handler deadline / comparison|
//!
//! ## Example
//!
//! ```rust
//! use mcp_gateway::error_code::GatewayErrorCode;
//!
//! let code = GatewayErrorCode::from_code("MISSING_PARAMETER").unwrap();
//! assert_eq!(code.as_str(), "MISSING_PARAMETER");
//! assert!(code.is_client_error());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical gateway error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayErrorCode {
    /// No tool is registered under the requested name
    ToolNotFound,
    /// A parameter declared `required` was not supplied
    MissingParameter,
    /// A supplied parameter does not match its declared type
    TypeMismatch,
    /// A tool with the same name is already registered
    DuplicateTool,
    /// The tool handler failed; the message is sanitized
    ExecutionError,
    /// The operation did not complete before its deadline
    Timeout,
}

impl GatewayErrorCode {
    pub const ALL: [GatewayErrorCode; 6] = [
        Self::ToolNotFound,
        Self::MissingParameter,
        Self::TypeMismatch,
        Self::DuplicateTool,
        Self::ExecutionError,
        Self::Timeout,
    ];

    /// Returns the wire string (e.g., `"TOOL_NOT_FOUND"`).
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolNotFound => "TOOL_NOT_FOUND",
            Self::MissingParameter => "MISSING_PARAMETER",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::DuplicateTool => "DUPLICATE_TOOL",
            Self::ExecutionError => "EXECUTION_ERROR",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Returns the category: `"client"`, `"execution"`, or `"transport"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::ToolNotFound
            | Self::MissingParameter
            | Self::TypeMismatch
            | Self::DuplicateTool => "client",
            Self::ExecutionError => "execution",
            Self::Timeout => "transport",
        }
    }

    /// Client errors are local validation failures; they are never logged as faults.
    #[inline]
    pub fn is_client_error(&self) -> bool {
        self.category() == "client"
    }

    /// Parses a wire string back into a code. Unknown strings return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_wire_strings() {
        let json = serde_json::to_string(&GatewayErrorCode::ToolNotFound).unwrap();
        assert_eq!(json, "\"TOOL_NOT_FOUND\"");
        let back: GatewayErrorCode = serde_json::from_str("\"EXECUTION_ERROR\"").unwrap();
        assert_eq!(back, GatewayErrorCode::ExecutionError);
    }

    #[test]
    fn test_from_code_matches_as_str() {
        for code in GatewayErrorCode::ALL {
            assert_eq!(GatewayErrorCode::from_code(code.as_str()), Some(code));
        }
        assert_eq!(GatewayErrorCode::from_code("E1001"), None);
    }

    #[test]
    fn test_categories() {
        assert!(GatewayErrorCode::TypeMismatch.is_client_error());
        assert!(!GatewayErrorCode::ExecutionError.is_client_error());
        assert_eq!(GatewayErrorCode::Timeout.category(), "transport");
    }
}
