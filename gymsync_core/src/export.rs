//! CSV export of the workout log.

use crate::{Result, WorkoutEntry};
use std::fs::File;
use std::path::Path;

const HEADERS: [&str; 8] = [
    "id", "exercise", "weight", "sets", "reps", "volume", "notes", "date",
];

/// A row in the CSV output; field order matches `HEADERS`
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: String,
    exercise: &'a str,
    weight: f64,
    sets: u32,
    reps: u32,
    volume: f64,
    notes: Option<&'a str>,
    date: String,
}

impl<'a> From<&'a WorkoutEntry> for CsvRow<'a> {
    fn from(entry: &'a WorkoutEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            exercise: &entry.exercise,
            weight: entry.weight,
            sets: entry.sets,
            reps: entry.reps,
            volume: entry.volume,
            notes: entry.notes.as_deref(),
            date: entry.timestamp.to_rfc3339(),
        }
    }
}

/// Write every entry to `csv_path`, replacing any existing file
///
/// The file is flushed and synced before returning. Returns the number of
/// rows written.
pub fn export_workouts_csv(entries: &[WorkoutEntry], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    // Serializing rows emits the header on its own, an empty log does not
    if entries.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for entry in entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} workouts to {:?}", entries.len(), csv_path);
    Ok(entries.len())
}
