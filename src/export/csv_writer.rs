//! CSV writer for extracted attendance.
//!
//! Writes in append-only mode so results of completed screenshots survive
//! a crash midway through a batch. One row per entry.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::table::AttendanceEntry;

/// CSV header row.
pub const CSV_HEADER: &str =
    "image,processed_at,course_code,course_name,class_type,present,total,percentage,confidence";

/// Initializes CSV file with header if it doesn't exist or is empty.
///
/// If the file exists and has content, this does nothing (preserves existing data).
pub fn init_csv(path: &Path) -> Result<()> {
    if path.exists() {
        let file = File::open(path).context("Failed to open existing CSV")?;
        let reader = BufReader::new(file);
        if reader.lines().next().is_some() {
            return Ok(());
        }
    }

    let mut file = File::create(path).context("Failed to create CSV file")?;
    writeln!(file, "{}", CSV_HEADER).context("Failed to write CSV header")?;
    Ok(())
}

/// Quotes a field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats one entry as a CSV row (no trailing newline).
pub fn format_row(image: &Path, processed_at: DateTime<Local>, entry: &AttendanceEntry) -> String {
    format!(
        "{},{},{},{},{},{},{},{:.1},{:.2}",
        csv_field(&image.display().to_string()),
        processed_at.format("%Y-%m-%dT%H:%M:%S"),
        csv_field(entry.course_code()),
        csv_field(entry.course_name()),
        entry.class_type(),
        entry.present(),
        entry.total(),
        entry.percentage(),
        entry.confidence(),
    )
}

/// Appends all entries of one screenshot to the CSV file.
pub fn append_entries(
    path: &Path,
    image: &Path,
    processed_at: DateTime<Local>,
    entries: &[AttendanceEntry],
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open CSV for append")?;

    for entry in entries {
        writeln!(file, "{}", format_row(image, processed_at, entry))
            .context("Failed to write CSV row")?;
    }
    Ok(())
}
