//! Record builders shared by service tests

use crate::domain::records::{Place, Report};
use crate::domain::types::{DoorType, Grade, PlaceId, RampType, ReportStatus, SlopeType};
use chrono::{DateTime, TimeZone, Utc};
use smallvec::SmallVec;

pub fn place_at(id: &str, created_at: DateTime<Utc>, district: Option<&str>) -> Place {
    Place {
        id: PlaceId::from(id),
        author_id: None,
        name: format!("place {id}"),
        address: String::new(),
        lat: 35.16,
        lng: 126.85,
        ramp: RampType::Flat,
        door: DoorType::Automatic,
        space: None,
        grade: Grade::Green,
        comment: String::new(),
        threshold: Some(0.0),
        door_width: Some(100.0),
        image_url: None,
        images: SmallVec::new(),
        has_restroom: false,
        has_parking: false,
        slope: 0.0,
        ramp_slope: None,
        ramp_width: None,
        has_bell: false,
        bell_status: None,
        district: district.map(str::to_string),
        neighborhood: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn place_with_grade(grade: Grade) -> Place {
    let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Place { grade, ..place_at("graded", t0, None) }
}

pub fn report_for(user_id: &str, created_at: DateTime<Utc>, district: Option<&str>) -> Report {
    Report {
        id: crate::domain::records::new_uuid_v7(),
        place_id: "temp_0".to_string(),
        place_name: "Station".to_string(),
        user_id: user_id.to_string(),
        latitude: 35.1,
        longitude: 126.9,
        district: district.map(str::to_string),
        neighborhood: None,
        address: String::new(),
        status: ReportStatus::Accessible,
        step_height_cm: 0.0,
        slope_type: SlopeType::Flat,
        photo_url1: None,
        photo_url2: None,
        user_memo: None,
        created_at,
        updated_at: created_at,
    }
}
