//! CSV export of reading histories.
//!
//! Blood pressure and heart rate histories can be written out as CSV for a
//! doctor or a spreadsheet. Each row carries the derived category so the
//! file reads on its own.

use crate::classify::{classify_bp, classify_heart_rate};
use crate::types::{BpReading, HeartRateReading, Record};
use crate::Result;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;

#[derive(Debug, Serialize)]
struct BpRow {
    id: u64,
    recorded_at: String,
    systolic: u16,
    diastolic: u16,
    pulse: Option<u16>,
    category: &'static str,
}

impl From<&Record<BpReading>> for BpRow {
    fn from(record: &Record<BpReading>) -> Self {
        BpRow {
            id: record.id.0,
            recorded_at: record.created_at.to_rfc3339(),
            systolic: record.fields.systolic,
            diastolic: record.fields.diastolic,
            pulse: record.fields.pulse,
            category: classify_bp(&record.fields).label,
        }
    }
}

#[derive(Debug, Serialize)]
struct HeartRateRow<'a> {
    id: u64,
    recorded_at: String,
    bpm: u16,
    zone: &'static str,
    notes: Option<&'a str>,
}

impl<'a> From<&'a Record<HeartRateReading>> for HeartRateRow<'a> {
    fn from(record: &'a Record<HeartRateReading>) -> Self {
        HeartRateRow {
            id: record.id.0,
            recorded_at: record.created_at.to_rfc3339(),
            bpm: record.fields.value,
            zone: classify_heart_rate(&record.fields).label,
            notes: record.fields.notes.as_deref(),
        }
    }
}

/// Write blood pressure readings to `path`, replacing any existing file.
/// Returns the number of rows written.
pub fn export_bp_readings(records: &[Record<BpReading>], path: &Path) -> Result<usize> {
    write_rows(path, records.iter().map(BpRow::from))
}

/// Write heart rate readings to `path`, replacing any existing file.
/// Returns the number of rows written.
pub fn export_heart_rate(records: &[Record<HeartRateReading>], path: &Path) -> Result<usize> {
    write_rows(path, records.iter().map(HeartRateRow::from))
}

fn write_rows<R, I>(path: &Path, rows: I) -> Result<usize>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} rows to {:?}", count, path);
    Ok(count)
}
