//! Lock-free metrics collection and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//! All counter updates are lock-free; reporting is the only operation
//! that needs synchronization (via atomic swap).
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use crate::domain::types::{Grade, ReportStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Prometheus-style exponential bucket boundaries (microseconds)
/// Buckets: ≤100, ≤200, ≤400, ≤800, ≤1600, ≤3200, ≤6400, ≤12800, ≤25600, ≤51200, >51200
const BUCKET_BOUNDS: [u64; 10] = [100, 200, 400, 800, 1600, 3200, 6400, 12800, 25600, 51200];
const NUM_BUCKETS: usize = 11;

/// Compute bucket index for a latency value using binary search
#[inline]
fn bucket_index(latency_us: u64) -> usize {
    BUCKET_BOUNDS.partition_point(|&bound| bound < latency_us)
}

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Swap all buckets to zero and return their values
#[inline]
fn swap_buckets(buckets: &[AtomicU64; NUM_BUCKETS]) -> [u64; NUM_BUCKETS] {
    let mut result = [0u64; NUM_BUCKETS];
    for (i, bucket) in buckets.iter().enumerate() {
        result[i] = bucket.swap(0, Ordering::Relaxed);
    }
    result
}

#[inline]
fn load_all<const N: usize>(counters: &[AtomicU64; N]) -> [u64; N] {
    let mut result = [0u64; N];
    for (i, counter) in counters.iter().enumerate() {
        result[i] = counter.load(Ordering::Relaxed);
    }
    result
}

/// Compute percentile from histogram buckets
/// Returns the upper bound of the bucket containing the percentile
fn percentile_from_buckets(buckets: &[u64; NUM_BUCKETS], percentile: f64) -> u64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return 0;
    }

    let target = (total as f64 * percentile) as u64;
    let mut cumulative = 0u64;

    // Upper bounds for each bucket (last bucket uses 2x the previous bound)
    const BUCKET_UPPER_BOUNDS: [u64; NUM_BUCKETS] =
        [100, 200, 400, 800, 1600, 3200, 6400, 12800, 25600, 51200, 102400];

    for (i, &count) in buckets.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return BUCKET_UPPER_BOUNDS[i];
        }
    }
    BUCKET_UPPER_BOUNDS[NUM_BUCKETS - 1]
}

fn grade_index(grade: Grade) -> usize {
    match grade {
        Grade::Red => 0,
        Grade::Yellow => 1,
        Grade::Green => 2,
    }
}

fn status_index(status: ReportStatus) -> usize {
    match status {
        ReportStatus::Accessible => 0,
        ReportStatus::Conditional => 1,
        ReportStatus::Inaccessible => 2,
    }
}

/// Lock-free metrics collector
///
/// All recording operations are lock-free using atomics.
/// The `report()` method atomically swaps counters to get a consistent snapshot.
pub struct Metrics {
    /// Total HTTP requests served (monotonic)
    requests_total: AtomicU64,
    /// Requests since last report (reset on report)
    requests_since_report: AtomicU64,
    /// Sum of request latencies in microseconds (reset on report)
    latency_sum_us: AtomicU64,
    /// Max request latency in microseconds (reset on report)
    latency_max_us: AtomicU64,
    /// Request latency histogram buckets (reset on report)
    latency_buckets: [AtomicU64; NUM_BUCKETS],
    /// Request latency histogram for scrapes (monotonic)
    latency_buckets_total: [AtomicU64; NUM_BUCKETS],
    /// Sum of all request latencies in microseconds (monotonic)
    latency_sum_total_us: AtomicU64,
    /// Requests rejected with 4xx (monotonic)
    bad_requests_total: AtomicU64,
    /// Places graded, indexed RED, YELLOW, GREEN (monotonic)
    places_graded: [AtomicU64; 3],
    /// Submissions decided by the stairs-only pre-check (monotonic)
    stairs_precheck_total: AtomicU64,
    /// Reports created, indexed ACCESSIBLE, CONDITIONAL, INACCESSIBLE (monotonic)
    reports_by_status: [AtomicU64; 3],
    /// Contributor points handed out (monotonic)
    points_awarded_total: AtomicU64,
    /// Last report time (only accessed from reporter, not atomic)
    last_report_time: parking_lot::Mutex<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_since_report: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_max_us: AtomicU64::new(0),
            latency_buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            latency_buckets_total: std::array::from_fn(|_| AtomicU64::new(0)),
            latency_sum_total_us: AtomicU64::new(0),
            bad_requests_total: AtomicU64::new(0),
            places_graded: std::array::from_fn(|_| AtomicU64::new(0)),
            stairs_precheck_total: AtomicU64::new(0),
            reports_by_status: std::array::from_fn(|_| AtomicU64::new(0)),
            points_awarded_total: AtomicU64::new(0),
            last_report_time: parking_lot::Mutex::new(Instant::now()),
        }
    }

    /// Record one served request (lock-free)
    #[inline]
    pub fn record_request(&self, latency_us: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.requests_since_report.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        update_atomic_max(&self.latency_max_us, latency_us);
        let idx = bucket_index(latency_us);
        self.latency_buckets[idx].fetch_add(1, Ordering::Relaxed);
        self.latency_buckets_total[idx].fetch_add(1, Ordering::Relaxed);
        self.latency_sum_total_us.fetch_add(latency_us, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_bad_request(&self) {
        self.bad_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a graded place; `precheck` marks the stairs-only short-circuit
    #[inline]
    pub fn record_graded(&self, grade: Grade, precheck: bool) {
        self.places_graded[grade_index(grade)].fetch_add(1, Ordering::Relaxed);
        if precheck {
            self.stairs_precheck_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_report(&self, status: ReportStatus, points: i64) {
        self.reports_by_status[status_index(status)].fetch_add(1, Ordering::Relaxed);
        self.points_awarded_total.fetch_add(points.max(0) as u64, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn bad_requests_total(&self) -> u64 {
        self.bad_requests_total.load(Ordering::Relaxed)
    }

    pub fn places_graded(&self, grade: Grade) -> u64 {
        self.places_graded[grade_index(grade)].load(Ordering::Relaxed)
    }

    pub fn stairs_precheck_total(&self) -> u64 {
        self.stairs_precheck_total.load(Ordering::Relaxed)
    }

    pub fn reports_created(&self, status: ReportStatus) -> u64 {
        self.reports_by_status[status_index(status)].load(Ordering::Relaxed)
    }

    pub fn points_awarded_total(&self) -> u64 {
        self.points_awarded_total.load(Ordering::Relaxed)
    }

    /// Cumulative latency histogram since startup (for scrapes)
    pub fn latency_buckets_total(&self) -> [u64; NUM_BUCKETS] {
        load_all(&self.latency_buckets_total)
    }

    pub fn latency_sum_total_us(&self) -> u64 {
        self.latency_sum_total_us.load(Ordering::Relaxed)
    }

    pub fn places_graded_all(&self) -> [u64; 3] {
        load_all(&self.places_graded)
    }

    pub fn reports_by_status_all(&self) -> [u64; 3] {
        load_all(&self.reports_by_status)
    }

    /// Calculate and return metrics summary, then reset periodic counters
    ///
    /// This is the only method that resets counters. It uses atomic swap
    /// to get a consistent snapshot while allowing concurrent updates.
    pub fn report(&self, place_count: usize, report_count: usize) -> MetricsSummary {
        let requests_count = self.requests_since_report.swap(0, Ordering::Relaxed);
        let latency_sum = self.latency_sum_us.swap(0, Ordering::Relaxed);
        let max_latency = self.latency_max_us.swap(0, Ordering::Relaxed);
        let lat_buckets = swap_buckets(&self.latency_buckets);

        let elapsed = {
            let mut last = self.last_report_time.lock();
            let elapsed = last.elapsed();
            *last = Instant::now();
            elapsed
        };

        let requests_per_sec = if elapsed.as_secs_f64() > 0.0 {
            requests_count as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let avg_latency = if requests_count > 0 { latency_sum / requests_count } else { 0 };

        MetricsSummary {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_per_sec,
            avg_latency_us: avg_latency,
            max_latency_us: max_latency,
            lat_buckets,
            lat_p50_us: percentile_from_buckets(&lat_buckets, 0.50),
            lat_p95_us: percentile_from_buckets(&lat_buckets, 0.95),
            lat_p99_us: percentile_from_buckets(&lat_buckets, 0.99),
            bad_requests_total: self.bad_requests_total.load(Ordering::Relaxed),
            places_graded: load_all(&self.places_graded),
            stairs_precheck_total: self.stairs_precheck_total.load(Ordering::Relaxed),
            reports_by_status: load_all(&self.reports_by_status),
            points_awarded_total: self.points_awarded_total.load(Ordering::Relaxed),
            place_count,
            report_count,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of histogram buckets (exported for Prometheus formatting)
pub const METRICS_NUM_BUCKETS: usize = NUM_BUCKETS;

/// Exported bucket bounds for Prometheus formatting
pub const METRICS_BUCKET_BOUNDS: [u64; 10] = BUCKET_BOUNDS;

#[derive(Debug)]
pub struct MetricsSummary {
    pub requests_total: u64,
    pub requests_per_sec: f64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
    /// Request latency histogram buckets
    /// Bounds: ≤100, ≤200, ≤400, ≤800, ≤1600, ≤3200, ≤6400, ≤12800, ≤25600, ≤51200, >51200 µs
    pub lat_buckets: [u64; NUM_BUCKETS],
    pub lat_p50_us: u64,
    pub lat_p95_us: u64,
    pub lat_p99_us: u64,
    pub bad_requests_total: u64,
    /// RED, YELLOW, GREEN
    pub places_graded: [u64; 3],
    pub stairs_precheck_total: u64,
    /// ACCESSIBLE, CONDITIONAL, INACCESSIBLE
    pub reports_by_status: [u64; 3],
    pub points_awarded_total: u64,
    pub place_count: usize,
    pub report_count: usize,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            requests_total = %self.requests_total,
            requests_per_sec = format!("{:.1}", self.requests_per_sec),
            avg_latency_us = %self.avg_latency_us,
            max_latency_us = %self.max_latency_us,
            p50_us = %self.lat_p50_us,
            p95_us = %self.lat_p95_us,
            p99_us = %self.lat_p99_us,
            bad_requests = %self.bad_requests_total,
            graded_red = %self.places_graded[0],
            graded_yellow = %self.places_graded[1],
            graded_green = %self.places_graded[2],
            stairs_precheck = %self.stairs_precheck_total,
            points_awarded = %self.points_awarded_total,
            places = %self.place_count,
            reports = %self.report_count,
            "metrics"
        );
    }
}
