//! Integration tests for rebuilding the store from its journal

use access_map::domain::records::RegionFilter;
use access_map::infra::{Config, Metrics};
use access_map::io::{dispatch, read_entries, ApiRequest, AppState, Journal, JournalEntry};
use access_map::services::regrade::{find_changes, latest_places};
use access_map::services::{FixedClock, PlaceStore};
use chrono::{TimeZone, Utc};
use hyper::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn post(state: &AppState, path: &str, user_id: Option<&str>, body: &str) -> StatusCode {
    dispatch(
        state,
        ApiRequest { method: &Method::POST, path, query: None, user_id, body: body.as_bytes() },
    )
    .status()
}

#[test]
fn test_replay_rebuilds_places_reports_and_scores() {
    let dir = tempdir().unwrap();
    let journal_path = dir.path().join("journal.jsonl");
    let journal_file = journal_path.to_str().unwrap();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let store = Arc::new(PlaceStore::new(Some(Journal::new(journal_file))));
    let state = AppState::new(
        &Config::default(),
        store.clone(),
        Arc::new(Metrics::new()),
        Arc::new(FixedClock(now)),
    );

    for name in ["kept", "removed"] {
        let body = json!({
            "name": name,
            "lat": 35.0,
            "lng": 126.0,
            "ramp": "평지",
            "door": "자동문",
            "door_width": 100,
        })
        .to_string();
        assert_eq!(post(&state, "/places", Some("u1"), &body), StatusCode::CREATED);
    }
    let removed = store
        .places(&RegionFilter::default())
        .into_iter()
        .find(|p| p.name == "removed")
        .unwrap();
    let status = dispatch(
        &state,
        ApiRequest {
            method: &Method::DELETE,
            path: "/places",
            query: Some(&format!("id={}", removed.id)),
            user_id: None,
            body: b"",
        },
    )
    .status();
    assert_eq!(status, StatusCode::OK);

    let report = json!({ "placeName": "kept", "userId": "u1", "latitude": 35.0, "longitude": 126.0 });
    assert_eq!(post(&state, "/reports", None, &report.to_string()), StatusCode::CREATED);

    let entries = read_entries(&journal_path).unwrap();
    let ops: Vec<&str> = entries.iter().map(JournalEntry::op).collect();
    assert_eq!(ops, ["place_upserted", "place_upserted", "place_deleted", "report_created"]);

    let restored = PlaceStore::restore(entries, None);
    assert_eq!(restored.places(&RegionFilter::default()), store.places(&RegionFilter::default()));
    assert_eq!(restored.place_count(), 1);
    assert_eq!(restored.report_count(), 1);
    assert_eq!(restored.contributor("u1").unwrap().score, 50);
}

#[test]
fn test_regrade_over_journal_finds_no_drift_for_fresh_grades() {
    let dir = tempdir().unwrap();
    let journal_path = dir.path().join("journal.jsonl");
    let store = Arc::new(PlaceStore::new(Some(Journal::new(journal_path.to_str().unwrap()))));
    let state = AppState::new(
        &Config::default(),
        store,
        Arc::new(Metrics::new()),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())),
    );

    for (ramp, door) in [("평지", "자동문"), ("경사로", "여닫이"), ("계단만", "미닫이")] {
        let body = json!({ "name": ramp, "lat": 1, "lng": 2, "ramp": ramp, "door": door })
            .to_string();
        assert_eq!(post(&state, "/places", None, &body), StatusCode::CREATED);
    }

    let places = latest_places(read_entries(&journal_path).unwrap());
    assert_eq!(places.len(), 3);
    assert!(find_changes(&places).is_empty());
}
