//! Hajri OCR
//!
//! Turns a screenshot of a university attendance dashboard into structured
//! attendance records. OCR is delegated to an external engine; this crate
//! rebuilds the table from the unordered fragments it returns.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod export;
pub mod ocr;
pub mod paths;
pub mod table;

pub use catalog::{CourseCatalog, CourseInfo};
pub use config::{ExtractorConfig, Zone, ZoneConfig};
pub use ocr::{AnchorExtractor, AttendanceExtractor, OcrEngine, OcrLine, TesseractEngine};
pub use table::{
    extract_entries, extract_from_lines, AttendanceEntry, ClassType, Extraction,
    ExtractionContext, ExtractionTrace,
};
