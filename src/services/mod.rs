//! Services - grading rules, marker classification and record management
//!
//! This module contains the core business logic services:
//! - `grading` - Entrance accessibility grade (RED / YELLOW / GREEN)
//! - `marker` - Map marker freshness and draw priority
//! - `report_status` - Status of quick field reports
//! - `gamification` - Points, levels and contributor tiers
//! - `stats` - Region accessibility summary
//! - `submission` - Normalizes client forms into graded records
//! - `store` - In-memory place/report store with journaling
//! - `regrade` - Finds stored grades that drifted from the rules

pub mod gamification;
pub mod grading;
pub mod marker;
pub mod regrade;
pub mod report_status;
pub mod stats;
pub mod store;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use grading::{grade, grade_submission};
pub use marker::{classify, prioritize, Clock, FixedClock, SystemClock};
pub use store::{PlaceStore, ReportReceipt, StoreError};
