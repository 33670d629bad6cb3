//! Entrance accessibility grading
//!
//! An ordered rule cascade evaluated top-down, first match wins:
//! 1. RED - stairs only, door narrower than 90cm, or threshold above 5cm
//! 2. YELLOW - ramp, hinged door, or threshold above 2cm
//! 3. GREEN - everything else
//!
//! Comparisons are strict: a 90cm door is not RED, a 5cm threshold is not
//! RED and a 2cm threshold is not YELLOW.

use crate::domain::types::{DoorType, Grade, GradeResult, PlaceMeasurement, RampType};

/// Narrowest door a wheelchair can pass without help (cm)
pub const MIN_DOOR_WIDTH_CM: f64 = 90.0;

/// Highest single step that can still be crossed with help (cm)
pub const MAX_THRESHOLD_CM: f64 = 5.0;

/// Highest step that can be crossed independently (cm)
pub const STEP_FREE_THRESHOLD_CM: f64 = 2.0;

pub const COMMENT_INACCESSIBLE: &str =
    "⛔ Wheelchair entry impossible (door narrower than 90cm or threshold too high)";
pub const COMMENT_NEEDS_HELP: &str =
    "⚠️ Assistance may be needed because of the threshold or door";
pub const COMMENT_STEP_FREE: &str =
    "✅ Threshold 2cm or less and door 90cm or wider, independent entry possible";

/// Comment used when the submitted entrance is stairs-only
pub const COMMENT_STAIRS_ONLY: &str = "Entrance is stairs-only, wheelchair entry impossible";

/// Grade an entrance from its measurements.
///
/// Total and pure: the caller normalizes missing values to 0 beforehand.
///
/// # Example
///
/// ```
/// use access_map::domain::types::{DoorType, Grade, PlaceMeasurement, RampType};
/// use access_map::services::grading::grade;
///
/// let result = grade(&PlaceMeasurement {
///     ramp_type: RampType::Flat,
///     door_type: DoorType::Automatic,
///     threshold_height_cm: 0.0,
///     door_width_cm: 90.0,
/// });
/// assert_eq!(result.grade, Grade::Green);
/// ```
pub fn grade(m: &PlaceMeasurement) -> GradeResult {
    if m.ramp_type == RampType::StairsOnly
        || m.door_width_cm < MIN_DOOR_WIDTH_CM
        || m.threshold_height_cm > MAX_THRESHOLD_CM
    {
        return GradeResult { grade: Grade::Red, comment: COMMENT_INACCESSIBLE };
    }

    if m.ramp_type == RampType::Ramp
        || m.door_type == DoorType::Hinged
        || m.threshold_height_cm > STEP_FREE_THRESHOLD_CM
    {
        return GradeResult { grade: Grade::Yellow, comment: COMMENT_NEEDS_HELP };
    }

    GradeResult { grade: Grade::Green, comment: COMMENT_STEP_FREE }
}

/// Grade a submitted place the way the place handlers do.
///
/// Stairs-only entrances short-circuit to RED with their own comment before
/// the rule cascade runs; everything else goes through [`grade`].
pub fn grade_submission(m: &PlaceMeasurement) -> GradeResult {
    if m.ramp_type == RampType::StairsOnly {
        return GradeResult { grade: Grade::Red, comment: COMMENT_STAIRS_ONLY };
    }
    grade(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(ramp: RampType, door: DoorType, threshold: f64, width: f64) -> PlaceMeasurement {
        PlaceMeasurement {
            ramp_type: ramp,
            door_type: door,
            threshold_height_cm: threshold,
            door_width_cm: width,
        }
    }

    fn step_free(threshold: f64, width: f64) -> PlaceMeasurement {
        measurement(RampType::Flat, DoorType::Automatic, threshold, width)
    }

    #[test]
    fn test_narrow_door_is_red() {
        let result = grade(&step_free(0.0, 89.9));
        assert_eq!(result.grade, Grade::Red);
        assert_eq!(result.comment, COMMENT_INACCESSIBLE);
    }

    #[test]
    fn test_high_threshold_is_red() {
        assert_eq!(grade(&step_free(5.01, 120.0)).grade, Grade::Red);
        assert_eq!(grade(&step_free(30.0, 120.0)).grade, Grade::Red);
    }

    #[test]
    fn test_stairs_only_is_red_even_with_perfect_metrics() {
        let m = measurement(RampType::StairsOnly, DoorType::Automatic, 0.0, 200.0);
        let result = grade(&m);
        assert_eq!(result.grade, Grade::Red);
        assert_eq!(result.comment, COMMENT_INACCESSIBLE);
    }

    #[test]
    fn test_door_width_boundary() {
        assert_eq!(grade(&step_free(0.0, 90.0)).grade, Grade::Green);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(grade(&step_free(2.0, 100.0)).grade, Grade::Green);
        assert_eq!(grade(&step_free(2.01, 100.0)).grade, Grade::Yellow);
        assert_eq!(grade(&step_free(5.0, 100.0)).grade, Grade::Yellow);
    }

    #[test]
    fn test_ramp_alone_is_yellow() {
        let m = measurement(RampType::Ramp, DoorType::Automatic, 0.0, 200.0);
        let result = grade(&m);
        assert_eq!(result.grade, Grade::Yellow);
        assert_eq!(result.comment, COMMENT_NEEDS_HELP);
    }

    #[test]
    fn test_hinged_door_is_yellow_sliding_is_green() {
        let hinged = measurement(RampType::Flat, DoorType::Hinged, 0.0, 100.0);
        let sliding = measurement(RampType::Flat, DoorType::Sliding, 0.0, 100.0);
        assert_eq!(grade(&hinged).grade, Grade::Yellow);
        assert_eq!(grade(&sliding).grade, Grade::Green);
        assert_eq!(grade(&sliding).comment, COMMENT_STEP_FREE);
    }

    #[test]
    fn test_red_rule_wins_over_yellow() {
        let m = measurement(RampType::Ramp, DoorType::Hinged, 3.0, 80.0);
        assert_eq!(grade(&m).grade, Grade::Red);
    }

    #[test]
    fn test_unmeasured_door_grades_red() {
        // Absent width is normalized to 0 by the caller
        assert_eq!(grade(&step_free(0.0, 0.0)).grade, Grade::Red);
    }

    #[test]
    fn test_submission_stairs_only_uses_own_comment() {
        let m = measurement(RampType::StairsOnly, DoorType::Automatic, 0.0, 200.0);
        let result = grade_submission(&m);
        assert_eq!(result.grade, Grade::Red);
        assert_eq!(result.comment, COMMENT_STAIRS_ONLY);
    }

    #[test]
    fn test_submission_delegates_otherwise() {
        for m in [
            step_free(0.0, 100.0),
            step_free(3.0, 100.0),
            step_free(0.0, 60.0),
            measurement(RampType::Ramp, DoorType::Sliding, 1.0, 95.0),
        ] {
            assert_eq!(grade_submission(&m), grade(&m));
        }
    }

    #[test]
    fn test_grade_is_idempotent() {
        let m = measurement(RampType::Flat, DoorType::Hinged, 1.5, 91.0);
        assert_eq!(grade(&m), grade(&m));
    }
}
