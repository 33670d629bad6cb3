//! Mutation journal - appends store changes to a JSONL file
//!
//! Every create, edit and delete is written as one JSON object per line
//! tagged with `op`. Replaying the file in order rebuilds the store.

use crate::domain::records::{Place, Report};
use crate::domain::types::PlaceId;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// One line of the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalEntry {
    PlaceUpserted { place: Place },
    PlaceDeleted { id: PlaceId },
    ReportCreated { report: Report, points: i64 },
}

impl JournalEntry {
    pub fn op(&self) -> &'static str {
        match self {
            JournalEntry::PlaceUpserted { .. } => "place_upserted",
            JournalEntry::PlaceDeleted { .. } => "place_deleted",
            JournalEntry::ReportCreated { .. } => "report_created",
        }
    }
}

/// Append-only journal writer
pub struct Journal {
    file_path: String,
}

impl Journal {
    pub fn new(file_path: &str) -> Self {
        info!(file_path = %file_path, "journal_initialized");
        Self { file_path: file_path.to_string() }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Append one entry to the journal file
    pub fn append(&self, entry: &JournalEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)?;
        self.append_line(&json)?;
        debug!(op = %entry.op(), bytes = %json.len(), "journal_appended");
        Ok(())
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let path = Path::new(&self.file_path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Read all entries from a journal file.
///
/// A missing file is an empty journal. Lines that fail to parse are logged
/// and skipped so one torn write does not lose the rest of the history.
pub fn read_entries<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<JournalEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        info!(file = %path.display(), "journal_missing_starting_empty");
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open journal {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read journal {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(file = %path.display(), line = %(idx + 1), error = %e, "journal_line_skipped");
            }
        }
    }

    info!(file = %path.display(), entries = %entries.len(), "journal_loaded");
    Ok(entries)
}
