//! Prometheus text exposition for GET /metrics
//!
//! Reads monotonic counters only, so scraping never disturbs the periodic
//! `Metrics::report()` window.

use crate::domain::types::{Grade, ReportStatus};
use crate::infra::metrics::{Metrics, METRICS_BUCKET_BOUNDS, METRICS_NUM_BUCKETS};
use std::fmt::Write;

/// Prometheus metric type
enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// Write a simple metric (counter or gauge) with site label
fn write_metric(
    output: &mut String,
    name: &str,
    help: &str,
    typ: MetricType,
    site: &str,
    val: u64,
) {
    let _ = writeln!(output, "# HELP {name} {help}");
    let _ = writeln!(output, "# TYPE {name} {}", typ.as_str());
    let _ = writeln!(output, "{name}{{site=\"{site}\"}} {val}");
}

/// Write one counter family with an extra label per series
fn write_labelled_counter(
    output: &mut String,
    name: &str,
    help: &str,
    site: &str,
    label: &str,
    series: &[(&str, u64)],
) {
    let _ = writeln!(output, "# HELP {name} {help}");
    let _ = writeln!(output, "# TYPE {name} counter");
    for (value, count) in series {
        let _ = writeln!(output, "{name}{{site=\"{site}\",{label}=\"{value}\"}} {count}");
    }
}

/// Write a histogram metric with buckets, sum, and count
fn write_histogram(
    output: &mut String,
    name: &str,
    help: &str,
    site: &str,
    buckets: &[u64; METRICS_NUM_BUCKETS],
    bounds: &[u64; 10],
    sum: u64,
) {
    let _ = writeln!(output, "# HELP {name} {help}");
    let _ = writeln!(output, "# TYPE {name} histogram");

    let mut cumulative = 0u64;
    for (i, &bound) in bounds.iter().enumerate() {
        cumulative += buckets[i];
        let _ = writeln!(output, "{name}_bucket{{site=\"{site}\",le=\"{bound}\"}} {cumulative}");
    }
    cumulative += buckets[METRICS_NUM_BUCKETS - 1];
    let _ = writeln!(output, "{name}_bucket{{site=\"{site}\",le=\"+Inf\"}} {cumulative}");

    let count: u64 = buckets.iter().sum();
    let _ = writeln!(output, "{name}_sum{{site=\"{site}\"}} {sum}");
    let _ = writeln!(output, "{name}_count{{site=\"{site}\"}} {count}");
}

/// Format metrics in Prometheus text exposition format
pub fn format_prometheus_metrics(
    metrics: &Metrics,
    place_count: usize,
    report_count: usize,
    site_id: &str,
) -> String {
    let mut output = String::with_capacity(4096);

    write_request_metrics(&mut output, site_id, metrics);
    write_grading_metrics(&mut output, site_id, metrics);
    write_report_metrics(&mut output, site_id, metrics);
    write_store_metrics(&mut output, site_id, place_count, report_count);

    output
}

fn write_request_metrics(output: &mut String, site: &str, metrics: &Metrics) {
    write_metric(
        output,
        "accessmap_requests_total",
        "Total HTTP requests served",
        MetricType::Counter,
        site,
        metrics.requests_total(),
    );
    write_metric(
        output,
        "accessmap_bad_requests_total",
        "Requests rejected with a client error",
        MetricType::Counter,
        site,
        metrics.bad_requests_total(),
    );
    write_histogram(
        output,
        "accessmap_request_latency_us",
        "Request handling latency in microseconds",
        site,
        &metrics.latency_buckets_total(),
        &METRICS_BUCKET_BOUNDS,
        metrics.latency_sum_total_us(),
    );
}

fn write_grading_metrics(output: &mut String, site: &str, metrics: &Metrics) {
    let graded = metrics.places_graded_all();
    let series: Vec<(&str, u64)> =
        Grade::ALL.iter().zip(graded).map(|(grade, count)| (grade.as_str(), count)).collect();
    write_labelled_counter(
        output,
        "accessmap_places_graded_total",
        "Places graded by outcome",
        site,
        "grade",
        &series,
    );
    write_metric(
        output,
        "accessmap_stairs_precheck_total",
        "Submissions decided by the stairs-only pre-check",
        MetricType::Counter,
        site,
        metrics.stairs_precheck_total(),
    );
}

fn write_report_metrics(output: &mut String, site: &str, metrics: &Metrics) {
    let created = metrics.reports_by_status_all();
    let series: Vec<(&str, u64)> = ReportStatus::ALL
        .iter()
        .zip(created)
        .map(|(status, count)| (status.as_str(), count))
        .collect();
    write_labelled_counter(
        output,
        "accessmap_reports_created_total",
        "Field reports created by derived status",
        site,
        "status",
        &series,
    );
    write_metric(
        output,
        "accessmap_points_awarded_total",
        "Contributor points awarded",
        MetricType::Counter,
        site,
        metrics.points_awarded_total(),
    );
}

fn write_store_metrics(output: &mut String, site: &str, place_count: usize, report_count: usize) {
    write_metric(
        output,
        "accessmap_places",
        "Places currently stored",
        MetricType::Gauge,
        site,
        place_count as u64,
    );
    write_metric(
        output,
        "accessmap_reports",
        "Reports currently stored",
        MetricType::Gauge,
        site,
        report_count as u64,
    );
}
