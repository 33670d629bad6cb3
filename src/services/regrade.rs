//! Re-running the grading rules over stored places
//!
//! Grades are denormalized onto each place when it is saved. After a rule
//! change, stored grades can drift from what the current rules produce;
//! this finds those places.

use crate::domain::records::{Place, RegionFilter};
use crate::domain::types::{Grade, PlaceId};
use crate::io::journal::JournalEntry;
use crate::services::grading::grade_submission;
use crate::services::store::PlaceStore;
use serde::Serialize;

/// A place whose stored grade no longer matches the rules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeChange {
    pub place_id: PlaceId,
    pub name: String,
    pub stored: Grade,
    pub current: Grade,
    pub comment: &'static str,
}

/// Latest snapshot of every place in a journal, newest first
pub fn latest_places(entries: Vec<JournalEntry>) -> Vec<Place> {
    PlaceStore::restore(entries, None).places(&RegionFilter::default())
}

pub fn find_changes(places: &[Place]) -> Vec<GradeChange> {
    places
        .iter()
        .filter_map(|place| {
            let result = grade_submission(&place.measurement());
            (result.grade != place.grade).then(|| GradeChange {
                place_id: place.id.clone(),
                name: place.name.clone(),
                stored: place.grade,
                current: result.grade,
                comment: result.comment,
            })
        })
        .collect()
}
