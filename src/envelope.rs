//! Envelope construction.
//!
//! Pure constructors for the two response shapes. Elapsed times are clamped so that
//! `execution_time_ms` is always a finite, non-negative number.

use serde_json::Value;
use std::time::Duration;

use crate::error_code::GatewayErrorCode;
use crate::types::{ErrorBody, Response};

/// Build a success envelope.
pub fn success(request_id: impl Into<String>, data: Value, elapsed_ms: f64) -> Response {
    Response::Success {
        request_id: request_id.into(),
        data,
        execution_time_ms: sanitize_ms(elapsed_ms),
    }
}

/// Build an error envelope.
pub fn error(
    request_id: impl Into<String>,
    code: GatewayErrorCode,
    message: impl Into<String>,
    elapsed_ms: f64,
) -> Response {
    Response::Error {
        request_id: request_id.into(),
        error: ErrorBody {
            code,
            message: message.into(),
        },
        execution_time_ms: sanitize_ms(elapsed_ms),
    }
}

/// Duration in fractional milliseconds.
pub fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

fn sanitize_ms(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 {
        ms
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_fields() {
        let resp = success("r2", json!({"results": ["a", "b"]}), 2.25);
        assert!(resp.is_success());
        assert_eq!(resp.request_id(), "r2");
        assert_eq!(resp.execution_time_ms(), 2.25);
        assert_eq!(resp.data(), Some(&json!({"results": ["a", "b"]})));
    }

    #[test]
    fn test_error_fields() {
        let resp = error("r1", GatewayErrorCode::ToolNotFound, "Tool 'x' not found", 0.5);
        assert_eq!(resp.error_code(), Some(GatewayErrorCode::ToolNotFound));
        assert_eq!(resp.request_id(), "r1");
    }

    #[test]
    fn test_elapsed_is_never_negative_or_nan() {
        assert_eq!(success("a", json!({}), -3.0).execution_time_ms(), 0.0);
        assert_eq!(success("a", json!({}), f64::NAN).execution_time_ms(), 0.0);
        assert_eq!(duration_ms(Duration::from_micros(1500)), 1.5);
    }
}
