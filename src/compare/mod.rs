//! 部署对比模块：对两个网关端点施加相同负载，统计延迟分布与可靠性。
//!
//! # Deployment Comparison
//!
//! A comparison run issues the same cyclic workload against two [`Endpoint`]s and
//! records one [`ComparisonSample`] per resolved request. Failures (transport errors,
//! error envelopes, timeouts) are samples with `success = false`; they never abort the
//! run and are never raised to the caller.
//!
//! Latency statistics use successful samples only; `success_rate` uses every resolved
//! sample. Percentiles are nearest-rank.
//!
//! ## Concurrency
//!
//! With `concurrency = 1` requests run strictly one after another. Above that, up to
//! `concurrency` requests are in flight per endpoint. Endpoints run one after the other
//! unless `parallel_endpoints` is set. Cancelling the run abandons in-flight requests
//! and leaves them out of the report.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mcp_gateway::compare::{compare, HttpEndpoint};
//!
//! # async fn run() -> mcp_gateway::Result<()> {
//! let a = HttpEndpoint::new("lambda", "https://lambda.example.com")?;
//! let b = HttpEndpoint::new("ec2", "http://10.0.0.5:8080")?;
//! let report = compare(&a, &b, 100, 4).await?;
//! println!("{}", mcp_gateway::compare::render_text(&report));
//! # Ok(())
//! # }
//! ```

mod endpoint;
mod engine;
mod report;
mod stats;

pub use endpoint::{CallOutcome, Endpoint, HttpEndpoint, LocalEndpoint, SampleError};
pub use engine::{
    compare, default_workload, CompareOptions, ComparisonEngine, ComparisonReport,
    ComparisonSample, DecidedBy, Verdict,
};
pub use report::{render_text, save_json};
pub use stats::{percentile, EndpointStats, LatencySummary};
