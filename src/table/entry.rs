//! Final attendance records and their assembly.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::validate::ValidatedRow;

/// Session kind of a course row. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassType {
    #[serde(rename = "LECT")]
    Lect,
    #[serde(rename = "LAB")]
    Lab,
}

impl ClassType {
    /// Detects a class type in free text, LECT taking priority over LAB.
    pub fn detect(text: &str) -> Option<Self> {
        let upper = text.to_uppercase();
        if upper.contains("LECT") {
            Some(ClassType::Lect)
        } else if upper.contains("LAB") {
            Some(ClassType::Lab)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Lect => "LECT",
            ClassType::Lab => "LAB",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("percentage {0} outside [0, 100]")]
    Percentage(f64),
    #[error("confidence {0} outside [0, 1]")]
    Confidence(f64),
    #[error("empty course code")]
    EmptyCode,
}

/// One extracted attendance record. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceEntry {
    course_code: String,
    course_name: String,
    class_type: ClassType,
    present: u32,
    total: u32,
    percentage: f64,
    confidence: f64,
}

impl AttendanceEntry {
    pub fn new(
        course_code: &str,
        course_name: &str,
        class_type: ClassType,
        present: u32,
        total: u32,
        percentage: f64,
        confidence: f64,
    ) -> Result<Self, EntryError> {
        if course_code.is_empty() {
            return Err(EntryError::EmptyCode);
        }
        if !(0.0..=100.0).contains(&percentage) {
            return Err(EntryError::Percentage(percentage));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(EntryError::Confidence(confidence));
        }
        Ok(Self {
            course_code: course_code.to_string(),
            course_name: course_name.to_string(),
            class_type,
            present,
            total,
            percentage,
            confidence,
        })
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn class_type(&self) -> ClassType {
        self.class_type
    }

    pub fn present(&self) -> u32 {
        self.present
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Sorts rows by (course_code, LECT before LAB) and builds final records.
///
/// A row that fails range checks is logged and dropped; the rest proceed.
pub fn assemble_entries(mut rows: Vec<ValidatedRow>, confidence: f64) -> Vec<AttendanceEntry> {
    rows.sort_by(|a, b| {
        a.course_code
            .cmp(&b.course_code)
            .then(a.class_type.cmp(&b.class_type))
    });

    rows.into_iter()
        .filter_map(|row| {
            match AttendanceEntry::new(
                &row.course_code,
                &row.course_name,
                row.class_type,
                row.present,
                row.total,
                row.percentage,
                confidence,
            ) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::error!(
                        "Dropping {} {}: {} ({}/{})",
                        row.course_code,
                        row.class_type,
                        e,
                        row.present,
                        row.total
                    );
                    None
                }
            }
        })
        .collect()
}
