//! Marker freshness classification
//!
//! Crowd-sourced reports age: fresh ones glow and pulse on the map, reports
//! untouched for a month fade out. The bucket is derived from the hours
//! elapsed since the record's last update:
//! - <= 48h: RECENT (opacity 1.0, stack 1000, pulse)
//! - >= 720h: STALE (opacity 0.5, stack 10)
//! - otherwise: NORMAL (opacity 1.0, stack 100)
//!
//! A timestamp in the future yields negative elapsed time and therefore
//! RECENT. Clock skew is not corrected here.

use crate::domain::types::{MarkerCategory, MarkerPriority};
use chrono::{DateTime, Utc};

/// Upper bound of the RECENT bucket (inclusive)
pub const RECENT_WINDOW_HOURS: f64 = 48.0;

/// Lower bound of the STALE bucket (inclusive, 30 days)
pub const STALE_AFTER_HOURS: f64 = 720.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

const RECENT: MarkerPriority =
    MarkerPriority { category: MarkerCategory::Recent, opacity: 1.0, stack_order: 1000, pulse: true };
const STALE: MarkerPriority =
    MarkerPriority { category: MarkerCategory::Stale, opacity: 0.5, stack_order: 10, pulse: false };
const NORMAL: MarkerPriority =
    MarkerPriority { category: MarkerCategory::Normal, opacity: 1.0, stack_order: 100, pulse: false };

/// Source of the evaluation instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Hours between `last_updated_at` and `now` (negative if the update is in the future)
#[inline]
pub fn elapsed_hours(last_updated_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - last_updated_at).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Classify a record by the age of its last update
pub fn classify(last_updated_at: DateTime<Utc>, now: DateTime<Utc>) -> MarkerPriority {
    let elapsed = elapsed_hours(last_updated_at, now);

    if elapsed <= RECENT_WINDOW_HOURS {
        return RECENT;
    }

    if elapsed >= STALE_AFTER_HOURS {
        return STALE;
    }

    NORMAL
}

/// A record paired with its display priority
#[derive(Debug, Clone, Copy)]
pub struct RankedMarker<'a, T> {
    pub record: &'a T,
    pub priority: MarkerPriority,
}

/// Classify a batch and return it in draw order.
///
/// Ascending stack order, so the top-most marker comes last. The sort is
/// stable: records in the same bucket keep their input order.
pub fn prioritize<'a, T, F>(records: &'a [T], now: DateTime<Utc>, updated_at: F) -> Vec<RankedMarker<'a, T>>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut ranked: Vec<RankedMarker<'a, T>> = records
        .iter()
        .map(|record| RankedMarker { record, priority: classify(updated_at(record), now) })
        .collect();
    ranked.sort_by_key(|m| m.priority.stack_order);
    ranked
}
