//! Latency and reliability aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::engine::ComparisonSample;

/// Nearest-rank percentile over an ascending slice: index `ceil(p * n) - 1`, clamped.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    // Absorb float noise so that e.g. 0.95 * 20 ranks as exactly 19.
    let rank = (p * n as f64 - 1e-9).ceil();
    let index = (rank as isize - 1).clamp(0, n as isize - 1) as usize;
    Some(sorted[index])
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Latency statistics over successful samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Sample standard deviation; 0 for fewer than two samples
    pub stddev_ms: f64,
}

impl LatencySummary {
    /// `None` when there is nothing to summarize.
    pub fn from_latencies(latencies: &[f64]) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        let mut sorted = latencies.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let stddev = if sorted.len() > 1 {
            let var = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };

        Some(Self {
            mean_ms: mean,
            median_ms: median(&sorted),
            p95_ms: percentile(&sorted, 0.95)?,
            p99_ms: percentile(&sorted, 0.99)?,
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            stddev_ms: stddev,
        })
    }
}

/// Aggregates for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub label: String,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    /// Percentage of all resolved samples that succeeded
    pub success_rate: f64,
    /// Absent when no sample succeeded
    pub latency: Option<LatencySummary>,
    /// Failure counts keyed by [`SampleError::kind`](super::SampleError::kind)
    #[serde(default)]
    pub errors: BTreeMap<String, usize>,
}

impl EndpointStats {
    pub fn from_samples(label: impl Into<String>, samples: &[ComparisonSample]) -> Self {
        let latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.latency_ms)
            .collect();

        let mut errors = BTreeMap::new();
        for err in samples.iter().filter_map(|s| s.error.as_ref()) {
            *errors.entry(err.kind()).or_insert(0) += 1;
        }

        let total = samples.len();
        let successful = latencies.len();
        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64 * 100.0
        };

        Self {
            label: label.into(),
            total_requests: total,
            successful_requests: successful,
            failed_requests: total - successful,
            success_rate,
            latency: LatencySummary::from_latencies(&latencies),
            errors,
        }
    }

    pub fn mean_ms(&self) -> Option<f64> {
        self.latency.as_ref().map(|l| l.mean_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::SampleError;

    fn sample(seq: usize, latency_ms: f64, error: Option<SampleError>) -> ComparisonSample {
        ComparisonSample {
            endpoint: "x".into(),
            sequence: seq,
            latency_ms,
            success: error.is_none(),
            error,
        }
    }

    #[test]
    fn test_nearest_rank() {
        let sorted: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(percentile(&sorted, 0.95), Some(19.0));
        assert_eq!(percentile(&sorted, 0.99), Some(20.0));
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&[7.0], 0.99), Some(7.0));
        assert_eq!(percentile(&[], 0.5), None);

        let hundred: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(percentile(&hundred, 0.95), Some(95.0));
        assert_eq!(percentile(&hundred, 0.99), Some(99.0));
    }

    #[test]
    fn test_summary_values() {
        let s = LatencySummary::from_latencies(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.mean_ms, 2.5);
        assert_eq!(s.median_ms, 2.5);
        assert_eq!(s.min_ms, 1.0);
        assert_eq!(s.max_ms, 4.0);
        assert_eq!(s.p95_ms, 4.0);
        assert!((s.stddev_ms - 1.2909944).abs() < 1e-6);

        let single = LatencySummary::from_latencies(&[5.0]).unwrap();
        assert_eq!(single.stddev_ms, 0.0);
        assert!(LatencySummary::from_latencies(&[]).is_none());
    }

    #[test]
    fn test_failures_excluded_from_latency() {
        let samples = vec![
            sample(0, 10.0, None),
            sample(1, 5000.0, Some(SampleError::Timeout { timeout_ms: 5000 })),
            sample(2, 20.0, None),
            sample(3, 1.0, Some(SampleError::HttpStatus { status: 500 })),
        ];
        let stats = EndpointStats::from_samples("x", &samples);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.successful_requests, 2);
        assert_eq!(stats.failed_requests, 2);
        assert_eq!(stats.success_rate, 50.0);
        let latency = stats.latency.unwrap();
        assert_eq!(latency.max_ms, 20.0);
        assert_eq!(latency.min_ms, 10.0);
        assert_eq!(stats.errors.get("timeout"), Some(&1));
        assert_eq!(stats.errors.get("http_status"), Some(&1));
    }

    #[test]
    fn test_all_failed_has_no_latency() {
        let samples = vec![sample(
            0,
            3.0,
            Some(SampleError::Transport {
                message: "refused".into(),
            }),
        )];
        let stats = EndpointStats::from_samples("x", &samples);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.latency.is_none());
        assert!(stats.mean_ms().is_none());
    }
}
