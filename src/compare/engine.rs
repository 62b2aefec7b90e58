//! Comparison run driver.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::endpoint::{Endpoint, SampleError};
use super::stats::EndpointStats;
use crate::config::CompareConfig;
use crate::envelope::duration_ms;
use crate::error::ErrorContext;
use crate::types::{GatewayCall, ToolRequest};
use crate::{Error, Result};

/// One resolved request against one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSample {
    pub endpoint: String,
    pub sequence: usize,
    pub latency_ms: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SampleError>,
}

/// Metric that decided the head-to-head verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecidedBy {
    Mean,
    P99,
}

/// Head-to-head result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub faster_endpoint: String,
    pub slower_endpoint: String,
    /// Slower mean minus faster mean
    pub difference_ms: f64,
    /// `|mean_a - mean_b|` relative to endpoint B's mean
    pub difference_percent: f64,
    pub decided_by: DecidedBy,
}

impl Verdict {
    /// Lower mean wins; equal means fall back to lower p99; a further tie has no winner.
    /// Endpoints without successful samples never get a verdict.
    pub fn decide(a: &EndpointStats, b: &EndpointStats) -> Option<Self> {
        let la = a.latency.as_ref()?;
        let lb = b.latency.as_ref()?;

        let (faster, slower, faster_lat, slower_lat, decided_by) = if la.mean_ms < lb.mean_ms {
            (a, b, la, lb, DecidedBy::Mean)
        } else if lb.mean_ms < la.mean_ms {
            (b, a, lb, la, DecidedBy::Mean)
        } else if la.p99_ms < lb.p99_ms {
            (a, b, la, lb, DecidedBy::P99)
        } else if lb.p99_ms < la.p99_ms {
            (b, a, lb, la, DecidedBy::P99)
        } else {
            return None;
        };

        let difference_ms = slower_lat.mean_ms - faster_lat.mean_ms;
        // Endpoint B is the baseline regardless of which side wins.
        let difference_percent = if lb.mean_ms > 0.0 {
            (la.mean_ms - lb.mean_ms).abs() / lb.mean_ms * 100.0
        } else {
            0.0
        };

        Some(Self {
            faster_endpoint: faster.label.clone(),
            slower_endpoint: slower.label.clone(),
            difference_ms,
            difference_percent,
            decided_by,
        })
    }
}

/// Result of one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Run start, seconds since the Unix epoch
    pub timestamp: f64,
    pub requests_per_endpoint: usize,
    pub concurrency: usize,
    /// True when the run was cancelled before every request resolved
    pub cancelled: bool,
    pub endpoint_a: EndpointStats,
    pub endpoint_b: EndpointStats,
    pub verdict: Option<Verdict>,
    #[serde(skip)]
    pub samples: Vec<ComparisonSample>,
}

/// Tunables for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub requests: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    /// Pause between requests; only applied to sequential runs
    pub delay: Duration,
    /// Drive both endpoints at the same time instead of one after the other
    pub parallel_endpoints: bool,
    /// Request mix, cycled by sequence number
    pub workload: Vec<GatewayCall>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            requests: 100,
            concurrency: 1,
            timeout: Duration::from_secs(30),
            delay: Duration::ZERO,
            parallel_endpoints: false,
            workload: default_workload(),
        }
    }
}

impl From<&CompareConfig> for CompareOptions {
    fn from(config: &CompareConfig) -> Self {
        Self {
            requests: config.requests,
            concurrency: config.concurrency,
            timeout: Duration::from_millis(config.timeout_ms),
            delay: Duration::from_millis(config.delay_ms),
            parallel_endpoints: config.parallel_endpoints,
            workload: default_workload(),
        }
    }
}

/// Default request mix: discovery plus one call to each built-in tool.
pub fn default_workload() -> Vec<GatewayCall> {
    let request = |tool: &str, params: serde_json::Value| {
        GatewayCall::invoke(ToolRequest::with_generated_id(tool).with_parameters(params))
    };
    vec![
        GatewayCall::ListTools,
        request("search", json!({"query": "test query", "limit": 5})),
        request("database", json!({"operation": "query", "table": "users"})),
        request("file_ops", json!({"operation": "list", "path": "/tmp"})),
    ]
}

/// Drives identical workloads against two endpoints.
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    options: CompareOptions,
}

impl ComparisonEngine {
    pub fn new(options: CompareOptions) -> Result<Self> {
        if options.requests == 0 {
            return Err(Error::validation_with_context(
                "request count must be at least 1",
                ErrorContext::new().with_field_path("compare.requests"),
            ));
        }
        if options.concurrency == 0 {
            return Err(Error::validation_with_context(
                "concurrency must be at least 1",
                ErrorContext::new().with_field_path("compare.concurrency"),
            ));
        }
        if options.workload.is_empty() {
            return Err(Error::validation_with_context(
                "workload must contain at least one call",
                ErrorContext::new().with_field_path("compare.workload"),
            ));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Run to completion.
    pub async fn compare(&self, a: &dyn Endpoint, b: &dyn Endpoint) -> ComparisonReport {
        self.compare_with_cancel(a, b, CancellationToken::new()).await
    }

    /// Run until done or until `token` is cancelled. In-flight requests at the moment of
    /// cancellation are abandoned and left out of the report.
    pub async fn compare_with_cancel(
        &self,
        a: &dyn Endpoint,
        b: &dyn Endpoint,
        token: CancellationToken,
    ) -> ComparisonReport {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        info!(
            endpoint_a = a.label(),
            endpoint_b = b.label(),
            requests = self.options.requests,
            concurrency = self.options.concurrency,
            "starting comparison run"
        );

        let (samples_a, samples_b) = if self.options.parallel_endpoints {
            tokio::join!(self.run_endpoint(a, &token), self.run_endpoint(b, &token))
        } else {
            let samples_a = self.run_endpoint(a, &token).await;
            let samples_b = self.run_endpoint(b, &token).await;
            (samples_a, samples_b)
        };

        let expected = self.options.requests;
        let cancelled =
            token.is_cancelled() && (samples_a.len() < expected || samples_b.len() < expected);

        let endpoint_a = EndpointStats::from_samples(a.label(), &samples_a);
        let endpoint_b = EndpointStats::from_samples(b.label(), &samples_b);
        let verdict = Verdict::decide(&endpoint_a, &endpoint_b);

        info!(
            cancelled,
            faster = verdict.as_ref().map(|v| v.faster_endpoint.as_str()).unwrap_or("-"),
            "comparison run finished"
        );

        let mut samples = samples_a;
        samples.extend(samples_b);

        ComparisonReport {
            timestamp,
            requests_per_endpoint: expected,
            concurrency: self.options.concurrency,
            cancelled,
            endpoint_a,
            endpoint_b,
            verdict,
            samples,
        }
    }

    /// Issue every request against one endpoint with at most `concurrency` in flight.
    pub async fn run_endpoint(
        &self,
        endpoint: &dyn Endpoint,
        token: &CancellationToken,
    ) -> Vec<ComparisonSample> {
        let sequential = self.options.concurrency == 1;
        let delay = self.options.delay;

        let requests = (0..self.options.requests).map(move |sequence| async move {
            if sequential && sequence > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.sample(endpoint, sequence).await
        });

        let mut samples: Vec<ComparisonSample> = stream::iter(requests)
            .buffer_unordered(self.options.concurrency)
            .take_until(token.cancelled())
            .collect()
            .await;

        samples.sort_by_key(|s| s.sequence);
        debug!(endpoint = endpoint.label(), resolved = samples.len(), "endpoint run finished");
        samples
    }

    async fn sample(&self, endpoint: &dyn Endpoint, sequence: usize) -> ComparisonSample {
        let workload = &self.options.workload;
        let call = &workload[sequence % workload.len()];
        let timeout = self.options.timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let started = Instant::now();
        let result = tokio::time::timeout(timeout, endpoint.call(call)).await;
        let latency_ms = duration_ms(started.elapsed());

        let error = match result {
            Err(_) => Some(SampleError::Timeout { timeout_ms }),
            Ok(Err(e)) => Some(SampleError::from_transport(&e)),
            Ok(Ok(outcome)) => outcome.failure(),
        };

        if let Some(err) = &error {
            debug!(endpoint = endpoint.label(), sequence, error = %err, "comparison request failed");
        }

        ComparisonSample {
            endpoint: endpoint.label().to_string(),
            sequence,
            latency_ms,
            success: error.is_none(),
            error,
        }
    }
}

/// Compare two endpoints with `request_count` requests each at the given concurrency.
pub async fn compare(
    endpoint_a: &dyn Endpoint,
    endpoint_b: &dyn Endpoint,
    request_count: usize,
    concurrency: usize,
) -> Result<ComparisonReport> {
    let engine = ComparisonEngine::new(CompareOptions {
        requests: request_count,
        concurrency,
        ..CompareOptions::default()
    })?;
    Ok(engine.compare(endpoint_a, endpoint_b).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::stats::LatencySummary;

    fn stats(label: &str, mean: f64, p99: f64) -> EndpointStats {
        EndpointStats {
            label: label.into(),
            total_requests: 1,
            successful_requests: 1,
            failed_requests: 0,
            success_rate: 100.0,
            latency: Some(LatencySummary {
                mean_ms: mean,
                median_ms: mean,
                p95_ms: p99,
                p99_ms: p99,
                min_ms: mean,
                max_ms: p99,
                stddev_ms: 0.0,
            }),
            errors: Default::default(),
        }
    }

    #[test]
    fn test_verdict_by_mean() {
        let v = Verdict::decide(&stats("lambda", 80.0, 90.0), &stats("ec2", 40.0, 95.0)).unwrap();
        assert_eq!(v.faster_endpoint, "ec2");
        assert_eq!(v.slower_endpoint, "lambda");
        assert_eq!(v.difference_ms, 40.0);
        assert_eq!(v.difference_percent, 100.0);
        assert_eq!(v.decided_by, DecidedBy::Mean);
    }

    #[test]
    fn test_verdict_percent_is_relative_to_endpoint_b() {
        let v = Verdict::decide(&stats("ec2", 40.0, 45.0), &stats("lambda", 80.0, 90.0)).unwrap();
        assert_eq!(v.faster_endpoint, "ec2");
        assert_eq!(v.difference_ms, 40.0);
        assert_eq!(v.difference_percent, 50.0);

        let zero = Verdict::decide(&stats("a", 5.0, 5.0), &stats("b", 0.0, 0.0)).unwrap();
        assert_eq!(zero.faster_endpoint, "b");
        assert_eq!(zero.difference_percent, 0.0);
    }

    #[test]
    fn test_verdict_tie_breaks() {
        let v = Verdict::decide(&stats("a", 10.0, 12.0), &stats("b", 10.0, 30.0)).unwrap();
        assert_eq!(v.faster_endpoint, "a");
        assert_eq!(v.decided_by, DecidedBy::P99);
        assert_eq!(v.difference_ms, 0.0);

        assert!(Verdict::decide(&stats("a", 10.0, 12.0), &stats("b", 10.0, 12.0)).is_none());
    }

    #[test]
    fn test_no_verdict_without_successes() {
        let mut b = stats("b", 1.0, 1.0);
        b.latency = None;
        assert!(Verdict::decide(&stats("a", 10.0, 12.0), &b).is_none());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let zero = CompareOptions {
            concurrency: 0,
            ..CompareOptions::default()
        };
        assert!(ComparisonEngine::new(zero).is_err());
        let none = CompareOptions {
            requests: 0,
            ..CompareOptions::default()
        };
        assert!(ComparisonEngine::new(none).is_err());
    }

    #[test]
    fn test_default_workload_mix() {
        let actions: Vec<_> = default_workload().iter().map(|c| c.action()).collect();
        assert_eq!(
            actions,
            vec!["list_tools", "invoke_tool", "invoke_tool", "invoke_tool"]
        );
    }
}
