//! Plain-text rendering and persistence of comparison reports.

use std::fmt::Write as _;
use std::path::Path;

use super::engine::ComparisonReport;
use super::stats::EndpointStats;
use crate::Result;

const RULE_WIDTH: usize = 80;

/// Render a report as a human-readable table.
pub fn render_text(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "DEPLOYMENT COMPARISON REPORT");
    let _ = writeln!(out, "{}", rule);
    if report.cancelled {
        let _ = writeln!(out, "  (run cancelled; partial results)");
    }

    for stats in [&report.endpoint_a, &report.endpoint_b] {
        render_endpoint(&mut out, stats);
    }

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "COMPARISON ANALYSIS");
    let _ = writeln!(out, "{}", rule);
    match &report.verdict {
        Some(v) => {
            let _ = writeln!(out, "  Faster Endpoint:     {}", v.faster_endpoint.to_uppercase());
            let _ = writeln!(
                out,
                "  Latency Difference:  {:.2} ms ({:.2}%)",
                v.difference_ms, v.difference_percent
            );
        }
        None => {
            let _ = writeln!(out, "  No winner");
        }
    }
    for stats in [&report.endpoint_a, &report.endpoint_b] {
        let _ = writeln!(
            out,
            "  {:<20} {:.2}%",
            format!("{} Reliability:", stats.label),
            stats.success_rate
        );
    }
    let _ = writeln!(out, "{}", rule);
    out
}

fn render_endpoint(out: &mut String, stats: &EndpointStats) {
    let _ = writeln!(out, "\n{} Endpoint:", stats.label.to_uppercase());
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "  Total Requests:      {}", stats.total_requests);
    let _ = writeln!(out, "  Successful:          {}", stats.successful_requests);
    let _ = writeln!(out, "  Failed:              {}", stats.failed_requests);
    let _ = writeln!(out, "  Success Rate:        {:.2}%", stats.success_rate);

    match &stats.latency {
        Some(l) => {
            let _ = writeln!(out, "  Mean Latency:        {:.2} ms", l.mean_ms);
            let _ = writeln!(out, "  Median Latency:      {:.2} ms", l.median_ms);
            let _ = writeln!(out, "  Min Latency:         {:.2} ms", l.min_ms);
            let _ = writeln!(out, "  Max Latency:         {:.2} ms", l.max_ms);
            let _ = writeln!(out, "  P95 Latency:         {:.2} ms", l.p95_ms);
            let _ = writeln!(out, "  P99 Latency:         {:.2} ms", l.p99_ms);
            let _ = writeln!(out, "  Std Deviation:       {:.2} ms", l.stddev_ms);
        }
        None => {
            let _ = writeln!(out, "  No successful requests");
        }
    }

    for (kind, count) in &stats.errors {
        let _ = writeln!(out, "  Errors [{}]: {}", kind, count);
    }
}

/// Write the report as pretty-printed JSON.
pub fn save_json(report: &ComparisonReport, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
