//! In-memory place and report store
//!
//! Holds places, reports and contributor scores behind one `RwLock`. Each
//! mutation is journaled and applied inside the same write-lock section, so
//! readers never see a record that is missing from the journal and the
//! journal order matches the apply order. Last writer wins on edits.

use crate::domain::records::{Contributor, Place, RegionFilter, Report};
use crate::domain::types::PlaceId;
use crate::io::journal::{Journal, JournalEntry};
use crate::services::gamification::{calculate_level, Action};
use crate::services::submission::SubmissionError;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("place {0} not found")]
    PlaceNotFound(PlaceId),
    #[error(transparent)]
    Invalid(#[from] SubmissionError),
    #[error("journal write failed: {0}")]
    Journal(#[from] std::io::Error),
}

/// Result of filing a report: what the contributor earned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReceipt {
    pub success: bool,
    pub report_id: String,
    pub points_awarded: i64,
    pub new_level: u32,
    pub new_title: &'static str,
    pub total_points: i64,
}

#[derive(Default)]
struct StoreInner {
    places: FxHashMap<PlaceId, Place>,
    /// Insertion order
    reports: Vec<Report>,
    contributors: FxHashMap<String, Contributor>,
}

impl StoreInner {
    fn apply(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::PlaceUpserted { place } => {
                self.places.insert(place.id.clone(), place);
            }
            JournalEntry::PlaceDeleted { id } => {
                self.places.remove(&id);
            }
            JournalEntry::ReportCreated { report, points } => {
                self.award(&report.user_id, points);
                self.reports.push(report);
            }
        }
    }

    fn award(&mut self, user_id: &str, points: i64) -> &Contributor {
        let contributor = self.contributors.entry(user_id.to_string()).or_insert_with(|| {
            Contributor { user_id: user_id.to_string(), score: 0, level: 1 }
        });
        contributor.score += points;
        contributor.level = calculate_level(contributor.score).level;
        contributor
    }
}

pub struct PlaceStore {
    inner: RwLock<StoreInner>,
    journal: Option<Journal>,
}

impl PlaceStore {
    pub fn new(journal: Option<Journal>) -> Self {
        Self { inner: RwLock::new(StoreInner::default()), journal }
    }

    /// Rebuild a store from journal entries without re-journaling them
    pub fn restore(entries: Vec<JournalEntry>, journal: Option<Journal>) -> Self {
        let mut inner = StoreInner::default();
        let count = entries.len();
        for entry in entries {
            inner.apply(entry);
        }
        info!(
            entries = %count,
            places = %inner.places.len(),
            reports = %inner.reports.len(),
            contributors = %inner.contributors.len(),
            "store_restored"
        );
        Self { inner: RwLock::new(inner), journal }
    }

    fn journal(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(entry) {
                error!(op = %entry.op(), error = %e, "journal_append_failed");
                return Err(StoreError::Journal(e));
            }
        }
        Ok(())
    }

    pub fn insert_place(&self, place: Place) -> Result<Place, StoreError> {
        let mut inner = self.inner.write();
        self.journal(&JournalEntry::PlaceUpserted { place: place.clone() })?;
        inner.places.insert(place.id.clone(), place.clone());
        debug!(place_id = %place.id, grade = %place.grade, "place_inserted");
        Ok(place)
    }

    /// Replace a place with a version built from the current one
    pub fn update_place<F>(&self, id: &PlaceId, build: F) -> Result<Place, StoreError>
    where
        F: FnOnce(&Place) -> Result<Place, SubmissionError>,
    {
        let mut inner = self.inner.write();
        let existing =
            inner.places.get(id).ok_or_else(|| StoreError::PlaceNotFound(id.clone()))?;
        let updated = build(existing)?;
        let entry = JournalEntry::PlaceUpserted { place: updated.clone() };
        self.journal(&entry)?;
        inner.places.insert(updated.id.clone(), updated.clone());
        debug!(place_id = %updated.id, grade = %updated.grade, "place_updated");
        Ok(updated)
    }

    pub fn delete_place(&self, id: &PlaceId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.places.contains_key(id) {
            return Err(StoreError::PlaceNotFound(id.clone()));
        }
        self.journal(&JournalEntry::PlaceDeleted { id: id.clone() })?;
        inner.places.remove(id);
        debug!(place_id = %id, "place_deleted");
        Ok(())
    }

    pub fn place(&self, id: &PlaceId) -> Option<Place> {
        self.inner.read().places.get(id).cloned()
    }

    /// Places in the region, newest first
    pub fn places(&self, filter: &RegionFilter) -> Vec<Place> {
        let inner = self.inner.read();
        let mut places: Vec<Place> =
            inner.places.values().filter(|p| filter.matches_place(p)).cloned().collect();
        sort_newest_first(&mut places);
        places
    }

    /// Places authored by a contributor, newest first
    pub fn places_by_author(&self, user_id: &str) -> Vec<Place> {
        let inner = self.inner.read();
        let mut places: Vec<Place> = inner
            .places
            .values()
            .filter(|p| p.author_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        sort_newest_first(&mut places);
        places
    }

    pub fn place_count(&self) -> usize {
        self.inner.read().places.len()
    }

    /// File a report and award the contributor in one step
    pub fn add_report(&self, report: Report, action: Action) -> Result<ReportReceipt, StoreError> {
        let points = action.points();
        let mut inner = self.inner.write();
        self.journal(&JournalEntry::ReportCreated { report: report.clone(), points })?;

        let report_id = report.id.clone();
        let contributor = inner.award(&report.user_id, points).clone();
        inner.reports.push(report);

        let level = calculate_level(contributor.score);
        info!(
            report_id = %report_id,
            user_id = %contributor.user_id,
            action = %action.as_str(),
            points = %points,
            total = %contributor.score,
            level = %level.level,
            "report_filed"
        );

        Ok(ReportReceipt {
            success: true,
            report_id,
            points_awarded: points,
            new_level: level.level,
            new_title: level.title,
            total_points: contributor.score,
        })
    }

    /// Reports in the region, newest first, at most `limit`
    pub fn reports(&self, filter: &RegionFilter, limit: usize) -> Vec<Report> {
        let inner = self.inner.read();
        // Latest insert first among equal timestamps
        let mut reports: Vec<Report> =
            inner.reports.iter().rev().filter(|r| filter.matches_report(r)).cloned().collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit);
        reports
    }

    pub fn report_count(&self) -> usize {
        self.inner.read().reports.len()
    }

    pub fn contributor(&self, user_id: &str) -> Option<Contributor> {
        self.inner.read().contributors.get(user_id).cloned()
    }
}

fn sort_newest_first(places: &mut [Place]) {
    places.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
