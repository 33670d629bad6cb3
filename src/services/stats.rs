//! Region accessibility summary for the dashboard

use crate::domain::records::Place;
use crate::domain::types::Grade;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    pub total_places: usize,
    pub green_places: usize,
    /// RED + YELLOW places
    pub issue_count: usize,
    /// Share of GREEN places, rounded percent (0 for an empty region)
    pub accessibility_score: u32,
}

impl RegionStats {
    pub fn compute<'a, I>(places: I) -> Self
    where
        I: IntoIterator<Item = &'a Place>,
    {
        let mut stats = Self::default();
        for place in places {
            stats.total_places += 1;
            match place.grade {
                Grade::Green => stats.green_places += 1,
                Grade::Red | Grade::Yellow => stats.issue_count += 1,
            }
        }
        if stats.total_places > 0 {
            let ratio = stats.green_places as f64 / stats.total_places as f64;
            stats.accessibility_score = (ratio * 100.0).round() as u32;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::place_with_grade;

    #[test]
    fn test_empty_region() {
        let places: Vec<Place> = Vec::new();
        let stats = RegionStats::compute(&places);
        assert_eq!(stats, RegionStats::default());
        assert_eq!(stats.accessibility_score, 0);
    }

    #[test]
    fn test_counts_and_score() {
        let places = vec![
            place_with_grade(Grade::Green),
            place_with_grade(Grade::Green),
            place_with_grade(Grade::Yellow),
        ];
        let stats = RegionStats::compute(&places);
        assert_eq!(stats.total_places, 3);
        assert_eq!(stats.green_places, 2);
        assert_eq!(stats.issue_count, 1);
        // 66.67 rounds up
        assert_eq!(stats.accessibility_score, 67);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(RegionStats::compute(&[place_with_grade(Grade::Red)])).unwrap();
        assert_eq!(json["totalPlaces"], 1);
        assert_eq!(json["issueCount"], 1);
        assert_eq!(json["accessibilityScore"], 0);
    }
}
