//! Accessibility status of a field report
//!
//! Reports carry a single step height and a coarse slope instead of the
//! full entrance survey, so they get a simpler status than places.

use crate::domain::types::{ReportStatus, SlopeType};

/// Step height that counts as level entry (cm)
pub const LEVEL_STEP_CM: f64 = 2.0;

/// Derive the report status, first match wins:
/// 1. step height <= 2cm
/// 2. flat or moderate slope
/// 3. steep slope -> conditional
/// 4. anything else -> inaccessible
pub fn determine_status(step_height_cm: f64, slope: &SlopeType) -> ReportStatus {
    if step_height_cm <= LEVEL_STEP_CM {
        return ReportStatus::Accessible;
    }
    match slope {
        SlopeType::Flat | SlopeType::Moderate => ReportStatus::Accessible,
        SlopeType::Steep => ReportStatus::Conditional,
        SlopeType::Other(_) => ReportStatus::Inaccessible,
    }
}
