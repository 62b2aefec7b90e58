//! 调度器：解析工具、校验参数、执行处理器并计时，始终返回唯一的响应信封。
//!
//! # Dispatcher
//!
//! [`Dispatcher::handle`] is the single entry point for tool invocations:
//!
//! 1. start the timer;
//! 2. resolve the tool (`TOOL_NOT_FOUND`);
//! 3. validate parameters (`MISSING_PARAMETER` / `TYPE_MISMATCH`);
//! 4. invoke the handler; handler errors and panics become `EXECUTION_ERROR`, an
//!    exceeded handler deadline becomes `TIMEOUT`;
//! 5. stop the timer and build exactly one envelope.
//!
//! The dispatcher owns no mutable state. It shares a frozen [`ToolRegistry`] through
//! an `Arc`, so `handle` can run concurrently on as many tasks as the transport wants.
//! If the future returned by `handle` is dropped before completion no envelope and no
//! telemetry record is produced.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::DispatchConfig;
use crate::envelope;
use crate::error_code::GatewayErrorCode;
use crate::registry::ToolRegistry;
use crate::telemetry::{InvocationRecord, InvocationSink, TracingSink};
use crate::types::{Response, ToolRequest, ToolSchema};
use crate::validation::{SchemaValidator, UnknownParameters};

/// Outcome of the handler call, before it is turned into an envelope.
enum Invocation {
    Completed(serde_json::Value),
    Failed(String),
    Panicked(String),
    TimedOut(Duration),
}

/// Resolves, validates, invokes and times tool calls.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    validator: SchemaValidator,
    handler_timeout: Option<Duration>,
    sink: Arc<dyn InvocationSink>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            validator: SchemaValidator::default(),
            handler_timeout: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Dispatcher configured from the `dispatch` config section.
    pub fn from_config(registry: Arc<ToolRegistry>, config: &DispatchConfig) -> Self {
        Self::new(registry)
            .with_unknown_parameters(config.unknown_parameters)
            .with_handler_timeout(config.handler_timeout())
    }

    pub fn with_unknown_parameters(mut self, policy: UnknownParameters) -> Self {
        self.validator = SchemaValidator::new(policy);
        self
    }

    pub fn with_handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn InvocationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Discovery: registered schemas in registration order.
    pub async fn list_tools(&self) -> Vec<ToolSchema> {
        let started = Instant::now();
        let tools = self.registry.list();
        let elapsed = envelope::duration_ms(started.elapsed());
        debug!(tool_count = tools.len(), "listed tools");
        self.emit(InvocationRecord::discovery(elapsed)).await;
        tools
    }

    /// Dispatch one request. Always returns exactly one envelope.
    pub async fn handle(&self, request: &ToolRequest) -> Response {
        let started = Instant::now();
        let response = self.dispatch(request, started).await;

        let mut record =
            InvocationRecord::invocation(&request.tool, response.execution_time_ms(), response.is_success())
                .with_request_id(&request.request_id);
        if let Some(code) = response.error_code() {
            record = record.with_error_code(code);
        }
        self.emit(record).await;
        response
    }

    async fn dispatch(&self, request: &ToolRequest, started: Instant) -> Response {
        let request_id = request.request_id.as_str();

        let entry = match self.registry.lookup(&request.tool) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(request_id, tool = %request.tool, "unknown tool");
                return envelope::error(
                    request_id,
                    e.code(),
                    e.to_string(),
                    elapsed_ms(started),
                );
            }
        };

        if let Err(failure) = self.validator.validate(entry.schema(), &request.parameters) {
            debug!(
                request_id,
                tool = %request.tool,
                code = %failure.code,
                parameter = %failure.parameter,
                "parameter validation failed"
            );
            return envelope::error(request_id, failure.code, failure.message, elapsed_ms(started));
        }

        let outcome = self.invoke(entry.handler().as_ref(), request).await;
        let elapsed = elapsed_ms(started);

        match outcome {
            Invocation::Completed(data) => {
                info!(request_id, tool = %request.tool, latency_ms = elapsed, "tool invocation completed");
                envelope::success(request_id, data, elapsed)
            }
            Invocation::Failed(detail) => {
                warn!(request_id, tool = %request.tool, latency_ms = elapsed, error = %detail, "tool invocation failed");
                envelope::error(
                    request_id,
                    GatewayErrorCode::ExecutionError,
                    format!("Tool '{}' failed to execute", request.tool),
                    elapsed,
                )
            }
            Invocation::Panicked(detail) => {
                warn!(request_id, tool = %request.tool, latency_ms = elapsed, panic = %detail, "tool handler panicked");
                envelope::error(
                    request_id,
                    GatewayErrorCode::ExecutionError,
                    format!("Tool '{}' failed to execute", request.tool),
                    elapsed,
                )
            }
            Invocation::TimedOut(limit) => {
                warn!(request_id, tool = %request.tool, limit_ms = limit.as_millis() as u64, "tool invocation timed out");
                envelope::error(
                    request_id,
                    GatewayErrorCode::Timeout,
                    format!(
                        "Tool '{}' did not complete within {} ms",
                        request.tool,
                        limit.as_millis()
                    ),
                    elapsed,
                )
            }
        }
    }

    /// The one catch-all point: nothing raised by a handler escapes this function.
    async fn invoke(
        &self,
        handler: &dyn crate::tools::ToolHandler,
        request: &ToolRequest,
    ) -> Invocation {
        let call = AssertUnwindSafe(handler.execute(&request.parameters)).catch_unwind();

        let result = match self.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => return Invocation::TimedOut(limit),
            },
            None => call.await,
        };

        match result {
            Ok(Ok(data)) => Invocation::Completed(data),
            Ok(Err(e)) => Invocation::Failed(e.to_string()),
            Err(payload) => Invocation::Panicked(panic_message(payload.as_ref())),
        }
    }

    async fn emit(&self, record: InvocationRecord) {
        if let Err(e) = self.sink.record(record).await {
            warn!(error = %e, "failed to record invocation");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.len())
            .field("validator", &self.validator)
            .field("handler_timeout", &self.handler_timeout)
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    envelope::duration_ms(started.elapsed())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
