//! Turning client submissions into graded records
//!
//! Normalization rules:
//! - unreadable or missing measurements are stored as `None` and graded as 0
//! - `ramp` and `door` must name a known variant
//! - `slope` defaults to 0, flags default to false
//! - the cover image defaults to the first uploaded image

use crate::domain::forms::{PlaceForm, ReportForm};
use crate::domain::records::{new_uuid_v7, Place, Report};
use crate::domain::types::{
    DoorType, ParseKindError, PlaceId, PlaceMeasurement, RampType, SlopeType,
};
use crate::services::grading::grade_submission;
use crate::services::report_status::determine_status;
use chrono::{DateTime, Utc};
use smallvec::SmallVec;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    InvalidKind(#[from] ParseKindError),
    #[error("{0} is required")]
    MissingField(&'static str),
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, SubmissionError> {
    value.ok_or(SubmissionError::MissingField(field))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Build a new graded place from a submission
pub fn new_place(
    form: PlaceForm,
    author_id: Option<String>,
    now: DateTime<Utc>,
) -> Result<Place, SubmissionError> {
    let id = PlaceId(new_uuid_v7());
    let author_id = non_empty(author_id).or_else(|| non_empty(form.author_id.clone()));
    build_place(form, id, author_id, now, now)
}

/// Rebuild an existing place from an edit submission.
///
/// Identity, author and creation time carry over from `existing`. Images and
/// the cover image are kept unless the edit sends a new list.
pub fn edited_place(
    existing: &Place,
    form: PlaceForm,
    now: DateTime<Utc>,
) -> Result<Place, SubmissionError> {
    let keep_images = form.images.is_none();
    let mut place = build_place(
        form,
        existing.id.clone(),
        existing.author_id.clone(),
        existing.created_at,
        now,
    )?;
    if keep_images {
        place.images = existing.images.clone();
        if place.image_url.is_none() {
            place.image_url = existing.image_url.clone();
        }
    }
    Ok(place)
}

fn build_place(
    form: PlaceForm,
    id: PlaceId,
    author_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<Place, SubmissionError> {
    if form.name.trim().is_empty() {
        return Err(SubmissionError::MissingField("name"));
    }
    let lat = required(form.lat, "lat")?;
    let lng = required(form.lng, "lng")?;
    let ramp: RampType = required(form.ramp.as_deref(), "ramp")?.parse()?;
    let door: DoorType = required(form.door.as_deref(), "door")?.parse()?;

    let measurement = PlaceMeasurement {
        ramp_type: ramp,
        door_type: door,
        threshold_height_cm: form.threshold.unwrap_or(0.0),
        door_width_cm: form.door_width.unwrap_or(0.0),
    };
    let result = grade_submission(&measurement);

    let images: SmallVec<[String; 4]> = form.images.unwrap_or_default().into_iter().collect();
    let image_url = non_empty(form.image_url).or_else(|| images.first().cloned());

    Ok(Place {
        id,
        author_id,
        name: form.name,
        address: form.address,
        lat,
        lng,
        ramp,
        door,
        space: form.space,
        grade: result.grade,
        comment: result.comment.to_string(),
        threshold: form.threshold,
        door_width: form.door_width,
        image_url,
        images,
        has_restroom: form.has_restroom,
        has_parking: form.has_parking,
        slope: form.slope.unwrap_or(0.0),
        ramp_slope: form.ramp_slope,
        ramp_width: form.ramp_width,
        has_bell: form.has_bell,
        bell_status: non_empty(form.bell_status),
        district: non_empty(form.district),
        neighborhood: non_empty(form.neighborhood),
        created_at,
        updated_at,
    })
}

/// Build a field report and derive its status
pub fn new_report(form: ReportForm, now: DateTime<Utc>) -> Result<Report, SubmissionError> {
    let user_id = required(non_empty(form.user_id), "userId")?;
    let latitude = required(form.latitude, "latitude")?;
    let longitude = required(form.longitude, "longitude")?;

    let step_height_cm = form.step_height_cm.unwrap_or(0.0);
    // A blank slope string counts as not given
    let slope_type = form
        .slope_type
        .filter(|slope| !slope.as_str().trim().is_empty())
        .unwrap_or(SlopeType::Flat);
    let status = determine_status(step_height_cm, &slope_type);

    let place_id = non_empty(form.place_id)
        .unwrap_or_else(|| format!("temp_{}", now.timestamp_millis()));

    Ok(Report {
        id: new_uuid_v7(),
        place_id,
        place_name: form.place_name,
        user_id,
        latitude,
        longitude,
        district: non_empty(form.district),
        neighborhood: non_empty(form.neighborhood),
        address: form.address.unwrap_or_default(),
        status,
        step_height_cm,
        slope_type,
        photo_url1: non_empty(form.photo_url1),
        photo_url2: non_empty(form.photo_url2),
        user_memo: form.user_memo,
        created_at: now,
        updated_at: now,
    })
}
