//! Property tests for entrance grading and marker classification

use access_map::domain::types::{
    DoorType, Grade, MarkerCategory, PlaceMeasurement, RampType, ReportStatus, SlopeType,
};
use access_map::services::grading::{grade, grade_submission, COMMENT_STAIRS_ONLY};
use access_map::services::marker::classify;
use access_map::services::report_status::determine_status;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn ramp_type() -> impl Strategy<Value = RampType> {
    prop_oneof![Just(RampType::Flat), Just(RampType::Ramp), Just(RampType::StairsOnly)]
}

fn door_type() -> impl Strategy<Value = DoorType> {
    prop_oneof![Just(DoorType::Automatic), Just(DoorType::Hinged), Just(DoorType::Sliding)]
}

fn measurement() -> impl Strategy<Value = PlaceMeasurement> {
    (ramp_type(), door_type(), 0.0..20.0f64, 0.0..250.0f64).prop_map(
        |(ramp_type, door_type, threshold_height_cm, door_width_cm)| PlaceMeasurement {
            ramp_type,
            door_type,
            threshold_height_cm,
            door_width_cm,
        },
    )
}

proptest! {
    #[test]
    fn narrow_door_is_always_red(
        ramp in ramp_type(),
        door in door_type(),
        threshold in 0.0..20.0f64,
        width in 0.0..89.999f64,
    ) {
        let m = PlaceMeasurement {
            ramp_type: ramp,
            door_type: door,
            threshold_height_cm: threshold,
            door_width_cm: width,
        };
        prop_assert_eq!(grade(&m).grade, Grade::Red);
    }

    #[test]
    fn high_threshold_is_always_red(
        ramp in ramp_type(),
        door in door_type(),
        threshold in 5.001..100.0f64,
        width in 0.0..250.0f64,
    ) {
        let m = PlaceMeasurement {
            ramp_type: ramp,
            door_type: door,
            threshold_height_cm: threshold,
            door_width_cm: width,
        };
        prop_assert_eq!(grade(&m).grade, Grade::Red);
    }

    #[test]
    fn stairs_only_is_always_red(m in measurement()) {
        let m = PlaceMeasurement { ramp_type: RampType::StairsOnly, ..m };
        prop_assert_eq!(grade(&m).grade, Grade::Red);

        let submitted = grade_submission(&m);
        prop_assert_eq!(submitted.grade, Grade::Red);
        prop_assert_eq!(submitted.comment, COMMENT_STAIRS_ONLY);
    }

    #[test]
    fn green_implies_step_free_entry(m in measurement()) {
        if grade(&m).grade == Grade::Green {
            prop_assert_eq!(m.ramp_type, RampType::Flat);
            prop_assert!(m.door_type != DoorType::Hinged);
            prop_assert!(m.threshold_height_cm <= 2.0);
            prop_assert!(m.door_width_cm >= 90.0);
        }
    }

    #[test]
    fn grading_is_deterministic(m in measurement()) {
        prop_assert_eq!(grade(&m), grade(&m));
        prop_assert_eq!(grade_submission(&m), grade_submission(&m));
    }

    #[test]
    fn submission_matches_engine_off_stairs(m in measurement()) {
        prop_assume!(m.ramp_type != RampType::StairsOnly);
        prop_assert_eq!(grade_submission(&m), grade(&m));
    }

    #[test]
    fn classify_follows_elapsed_hours(elapsed_ms in -86_400_000i64..5_000_000_000i64) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let updated = now - Duration::milliseconds(elapsed_ms);
        let hours = elapsed_ms as f64 / 3_600_000.0;

        let priority = classify(updated, now);
        let expected = if hours <= 48.0 {
            MarkerCategory::Recent
        } else if hours >= 720.0 {
            MarkerCategory::Stale
        } else {
            MarkerCategory::Normal
        };
        prop_assert_eq!(priority.category, expected);
        prop_assert_eq!(priority, classify(updated, now));
    }

    #[test]
    fn low_step_report_is_accessible(step in 0.0..=2.0f64, steep in any::<bool>()) {
        let slope = if steep { SlopeType::Steep } else { SlopeType::Other("gravel".to_string()) };
        prop_assert_eq!(determine_status(step, &slope), ReportStatus::Accessible);
    }
}
