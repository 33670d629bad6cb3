//! Stored records: places, field reports and contributors

use crate::domain::types::{DoorType, Grade, PlaceId, PlaceMeasurement, RampType, ReportStatus, SlopeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Region value meaning "no filter"
const ALL_REGIONS: [&str; 2] = ["전체", "all"];

/// Generate a new UUIDv7 (time-sortable)
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

/// A mapped place with its entrance attributes and denormalized grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    #[serde(default)]
    pub author_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub ramp: RampType,
    pub door: DoorType,
    #[serde(default)]
    pub space: Option<String>,
    pub grade: Grade,
    pub comment: String,
    pub threshold: Option<f64>,
    pub door_width: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: SmallVec<[String; 4]>,
    pub has_restroom: bool,
    pub has_parking: bool,
    pub slope: f64,
    pub ramp_slope: Option<f64>,
    pub ramp_width: Option<f64>,
    pub has_bell: bool,
    pub bell_status: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Entrance measurements as the grading rules see them (unknown values as 0)
    pub fn measurement(&self) -> PlaceMeasurement {
        PlaceMeasurement {
            ramp_type: self.ramp,
            door_type: self.door,
            threshold_height_cm: self.threshold.unwrap_or(0.0),
            door_width_cm: self.door_width.unwrap_or(0.0),
        }
    }
}

/// A field report submitted from the report screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub place_id: String,
    pub place_name: String,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub address: String,
    pub status: ReportStatus,
    pub step_height_cm: f64,
    pub slope_type: SlopeType,
    pub photo_url1: Option<String>,
    pub photo_url2: Option<String>,
    pub user_memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Points and level accrued by a contributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub user_id: String,
    pub score: i64,
    pub level: u32,
}

/// District / neighborhood filter shared by listings and stats
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilter {
    pub district: Option<String>,
    pub neighborhood: Option<String>,
}

impl RegionFilter {
    /// Build a filter, treating empty values and the "all" sentinel as unset
    pub fn new(district: Option<&str>, neighborhood: Option<&str>) -> Self {
        Self { district: Self::normalize(district), neighborhood: Self::normalize(neighborhood) }
    }

    fn normalize(value: Option<&str>) -> Option<String> {
        let value = value?.trim();
        if value.is_empty() || ALL_REGIONS.contains(&value) {
            return None;
        }
        Some(value.to_string())
    }

    pub fn matches(&self, district: Option<&str>, neighborhood: Option<&str>) -> bool {
        let district_ok = self.district.as_deref().is_none_or(|d| district == Some(d));
        let neighborhood_ok =
            self.neighborhood.as_deref().is_none_or(|n| neighborhood == Some(n));
        district_ok && neighborhood_ok
    }

    pub fn matches_place(&self, place: &Place) -> bool {
        self.matches(place.district.as_deref(), place.neighborhood.as_deref())
    }

    pub fn matches_report(&self, report: &Report) -> bool {
        self.matches(report.district.as_deref(), report.neighborhood.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uuid_v7_is_unique() {
        let a = new_uuid_v7();
        let b = new_uuid_v7();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_region_filter_all_sentinel() {
        let filter = RegionFilter::new(Some("전체"), Some(""));
        assert_eq!(filter, RegionFilter::default());
        assert!(filter.matches(None, None));
        assert!(filter.matches(Some("북구"), Some("용봉동")));
    }

    #[test]
    fn test_region_filter_matches() {
        let filter = RegionFilter::new(Some("북구"), None);
        assert!(filter.matches(Some("북구"), Some("용봉동")));
        assert!(!filter.matches(Some("동구"), Some("용봉동")));
        assert!(!filter.matches(None, None));

        let filter = RegionFilter::new(Some("북구"), Some("용봉동"));
        assert!(filter.matches(Some("북구"), Some("용봉동")));
        assert!(!filter.matches(Some("북구"), Some("중흥동")));
    }
}
