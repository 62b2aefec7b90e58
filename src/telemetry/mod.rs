//! 遥测模块：为每次工具调用与发现请求输出结构化调用记录。
//!
//! Invocation telemetry.
//!
//! The dispatcher emits one [`InvocationRecord`] per `handle` call and one per
//! discovery call. Where records go is up to the configured [`InvocationSink`]; the
//! gateway itself never stores them.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`InvocationRecord`] | `{timestamp, action, tool_name, latency_ms, success}` |
//! | [`InvocationSink`] | Trait for record destinations |
//! | [`NoopSink`] | Discards records |
//! | [`TracingSink`] | Emits each record as a structured `tracing` event (default) |
//! | [`InMemorySink`] | Bounded in-memory sink for tests |
//! | [`CompositeSink`] | Fans records out to several sinks |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error_code::GatewayErrorCode;
use crate::Result;

fn timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// One observability record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    /// `invoke_tool` or `list_tools`
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub latency_ms: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<GatewayErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl InvocationRecord {
    pub fn invocation(tool_name: impl Into<String>, latency_ms: f64, success: bool) -> Self {
        Self {
            timestamp: timestamp(),
            action: "invoke_tool".to_string(),
            tool_name: Some(tool_name.into()),
            latency_ms,
            success,
            error_code: None,
            request_id: None,
        }
    }

    pub fn discovery(latency_ms: f64) -> Self {
        Self {
            timestamp: timestamp(),
            action: "list_tools".to_string(),
            tool_name: None,
            latency_ms,
            success: true,
            error_code: None,
            request_id: None,
        }
    }

    pub fn with_error_code(mut self, code: GatewayErrorCode) -> Self {
        self.error_code = Some(code);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Destination for invocation records.
#[async_trait]
pub trait InvocationSink: Send + Sync {
    async fn record(&self, record: InvocationRecord) -> Result<()>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl InvocationSink for NoopSink {
    async fn record(&self, _record: InvocationRecord) -> Result<()> {
        Ok(())
    }
}

/// Emits records as `tracing` events on the `mcp_gateway::telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl InvocationSink for TracingSink {
    async fn record(&self, record: InvocationRecord) -> Result<()> {
        let tool = record.tool_name.as_deref().unwrap_or("-");
        let code = record.error_code.map(|c| c.as_str()).unwrap_or("-");
        if record.success {
            tracing::info!(
                timestamp = record.timestamp,
                action = %record.action,
                tool_name = tool,
                latency_ms = record.latency_ms,
                success = true,
                "Request processed"
            );
        } else {
            tracing::info!(
                timestamp = record.timestamp,
                action = %record.action,
                tool_name = tool,
                latency_ms = record.latency_ms,
                success = false,
                error_code = code,
                "Request failed"
            );
        }
        Ok(())
    }
}

/// Bounded in-memory sink; the oldest record is dropped once `max_records` is reached.
pub struct InMemorySink {
    records: Mutex<VecDeque<InvocationRecord>>,
    max_records: usize,
}

impl InMemorySink {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            max_records,
        }
    }

    pub fn records(&self) -> Vec<InvocationRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn records_for_tool(&self, tool_name: &str) -> Vec<InvocationRecord> {
        self.lock()
            .iter()
            .filter(|r| r.tool_name.as_deref() == Some(tool_name))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<InvocationRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl InvocationSink for InMemorySink {
    async fn record(&self, record: InvocationRecord) -> Result<()> {
        let mut records = self.lock();
        records.push_back(record);
        while records.len() > self.max_records {
            records.pop_front();
        }
        Ok(())
    }
}

/// Composite sink for multiple destinations. A failing sink does not block the others.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn InvocationSink>>,
}

impl CompositeSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(mut self, sink: Arc<dyn InvocationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl InvocationSink for CompositeSink {
    async fn record(&self, record: InvocationRecord) -> Result<()> {
        for s in &self.sinks {
            if let Err(e) = s.record(record.clone()).await {
                tracing::warn!(error = %e, "invocation sink failed");
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        for s in &self.sinks {
            if let Err(e) = s.close().await {
                tracing::warn!(error = %e, "invocation sink failed to close");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_sink_is_bounded() {
        let sink = InMemorySink::new(2);
        for i in 0..3 {
            sink.record(InvocationRecord::invocation(format!("t{}", i), 1.0, true))
                .await
                .unwrap();
        }
        let names: Vec<_> = sink
            .records()
            .into_iter()
            .filter_map(|r| r.tool_name)
            .collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_composite_fans_out() {
        let a = Arc::new(InMemorySink::default());
        let b = Arc::new(InMemorySink::default());
        let composite = CompositeSink::new()
            .add_sink(a.clone())
            .add_sink(b.clone())
            .add_sink(Arc::new(TracingSink));
        composite
            .record(InvocationRecord::discovery(0.1))
            .await
            .unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a.records()[0].action, "list_tools");
    }

    struct RefusingSink;

    #[async_trait]
    impl InvocationSink for RefusingSink {
        async fn record(&self, _record: InvocationRecord) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Err(crate::Error::validation_with_context(
                "sink already closed",
                crate::error::ErrorContext::new().with_source("refusing_sink"),
            ))
        }
    }

    #[tokio::test]
    async fn test_composite_close_survives_failing_sink() {
        let kept = Arc::new(InMemorySink::default());
        let composite = CompositeSink::new()
            .add_sink(Arc::new(RefusingSink))
            .add_sink(kept.clone());
        composite.record(InvocationRecord::discovery(0.2)).await.unwrap();
        assert!(composite.close().await.is_ok());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_record_serialization_omits_empty_fields() {
        let record = InvocationRecord::invocation("search", 3.0, false)
            .with_error_code(GatewayErrorCode::ExecutionError);
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["tool_name"], "search");
        assert_eq!(v["error_code"], "EXECUTION_ERROR");
        assert!(v.get("request_id").is_none());
    }
}
