//! Log levels emitted by the pipeline for partial or inconsistent rows.
//!
//! The logger is process-global, so this binary holds a single test.

use std::sync::Mutex;

use hajri_ocr::{extract_from_lines, ExtractionContext, ExtractorConfig, OcrLine};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct Recorder {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Recorder {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder {
    records: Mutex::new(Vec::new()),
};

fn line_at(text: &str, x: f32, y: f32) -> OcrLine {
    OcrLine::from_rect(x - 30.0, y - 10.0, 60.0, 20.0, text, 0.9)
}

fn has_record(records: &[(Level, String)], level: Level, needle: &str) -> bool {
    records
        .iter()
        .any(|(l, msg)| *l == level && msg.contains(needle))
}

#[test]
fn test_partial_rows_are_logged_at_expected_levels() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let lines = vec![
        // Attendance but no percentage
        line_at("CSUC201", 100.0, 200.0),
        line_at("LECT", 400.0, 200.0),
        line_at("42/59", 600.0, 200.0),
        // Neither attendance nor percentage
        line_at("MATH101", 100.0, 300.0),
        line_at("LAB", 400.0, 300.0),
        // present > total; the computed percentage is out of range
        line_at("PHYS101", 100.0, 400.0),
        line_at("LECT", 400.0, 400.0),
        line_at("70/59", 600.0, 400.0),
        // Percentage disagrees with the fraction
        line_at("CHEM101", 100.0, 500.0),
        line_at("LAB", 400.0, 500.0),
        line_at("42/59", 600.0, 500.0),
        line_at("90%", 900.0, 500.0),
    ];
    let config = ExtractorConfig::default();
    let result = extract_from_lines(&lines, Some(1000.0), ExtractionContext::new(&config));

    let codes: Vec<&str> = result.entries.iter().map(|e| e.course_code()).collect();
    assert_eq!(codes, vec!["CHEM101", "CSUC201", "MATH101"]);
    assert_eq!(result.entries[1].percentage(), 71.2);

    let records = RECORDER.records.lock().unwrap().clone();
    assert!(has_record(&records, Level::Warn, "Missing percentage for CSUC201 LECT"));
    assert!(has_record(&records, Level::Warn, "Missing attendance for MATH101 LAB"));
    assert!(has_record(&records, Level::Warn, "present > total for PHYS101 LECT"));
    assert!(has_record(&records, Level::Warn, "Percentage mismatch for CHEM101 LAB"));
    assert!(has_record(&records, Level::Warn, "Dictionary miss: CSUC201"));
    assert!(has_record(&records, Level::Error, "Dropping PHYS101 LECT"));
    assert!(has_record(&records, Level::Info, "Extracted 3 attendance entries"));
}
