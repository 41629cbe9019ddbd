//! Anchor-based reconstruction of the attendance table.
//!
//! Rows do not exist in OCR output, anchors do. A logical row is a
//! (course_code, class_type) pair; every other field attaches to an anchor
//! by geometry. Each stage is a plain function over the previous stage's
//! output, and one call shares nothing with the next.

pub mod anchor;
pub mod dictionary;
pub mod entry;
pub mod field;
pub mod matcher;
pub mod normalize;
pub mod token;
pub mod validate;

pub use anchor::{detect_anchors, Anchor};
pub use dictionary::{build_course_dictionary, CourseDictionary};
pub use entry::{assemble_entries, AttendanceEntry, ClassType, EntryError};
pub use normalize::normalize_course_code;
pub use token::{split_regions, tokenize, RegionSplit, Token, TokenPage};

use serde::Serialize;

use crate::catalog::CourseCatalog;
use crate::config::ExtractorConfig;
use crate::ocr::OcrLine;
use field::{detect_attendance_fields, detect_percentage_fields};
use matcher::match_fields;
use validate::{deduplicate, inject_course_names, validate_rows};

/// Everything one extraction call reads besides the tokens.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub config: &'a ExtractorConfig,
    pub catalog: Option<&'a CourseCatalog>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(config: &'a ExtractorConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, catalog: &'a CourseCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// Intermediate results of one call, for debugging output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionTrace {
    pub image_width: f32,
    pub split_x: f32,
    pub data_width: f32,
    pub has_legend: bool,
    pub token_count: usize,
    pub left_count: usize,
    pub right_count: usize,
    pub anchors: Vec<Anchor>,
    pub attendance_fields: usize,
    pub percentage_fields: usize,
    pub dictionary: CourseDictionary,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub entries: Vec<AttendanceEntry>,
    pub trace: ExtractionTrace,
}

/// Runs the whole pipeline over raw OCR lines.
pub fn extract_from_lines(
    lines: &[OcrLine],
    image_width: Option<f32>,
    ctx: ExtractionContext<'_>,
) -> Extraction {
    extract_entries(&tokenize(lines, image_width), ctx)
}

/// Runs the whole pipeline over one page of tokens.
///
/// Never fails: an empty result means no attendance data was found.
pub fn extract_entries(page: &TokenPage, ctx: ExtractionContext<'_>) -> Extraction {
    let config = ctx.config;
    let mut trace = ExtractionTrace {
        image_width: page.image_width,
        token_count: page.tokens.len(),
        ..Default::default()
    };

    if page.tokens.is_empty() {
        log::info!("No OCR tokens, nothing to extract");
        return Extraction {
            entries: Vec::new(),
            trace,
        };
    }

    let split = split_regions(&page.tokens, page.image_width, config.region_split_threshold);
    trace.split_x = split.split_x;
    trace.data_width = split.data_width;
    trace.has_legend = split.has_legend;
    trace.left_count = split.left.len();
    trace.right_count = split.right.len();
    log::debug!(
        "Left: {} tokens, Right: {} tokens (split at x={:.1})",
        split.left.len(),
        split.right.len(),
        split.split_x
    );

    let anchors = detect_anchors(&split.left, split.data_width, config);
    if anchors.is_empty() {
        log::info!("No anchors detected in {} tokens", page.tokens.len());
        return Extraction {
            entries: Vec::new(),
            trace,
        };
    }

    let attendance = detect_attendance_fields(&split.left, split.data_width, config);
    let percentages = detect_percentage_fields(&split.left, split.data_width, config);
    trace.attendance_fields = attendance.len();
    trace.percentage_fields = percentages.len();
    log::debug!(
        "Found {} anchors, {} attendance fields, {} percentage fields",
        anchors.len(),
        attendance.len(),
        percentages.len()
    );

    let rows = match_fields(&anchors, &attendance, &percentages, config.y_tolerance);
    trace.anchors = anchors;

    let dictionary =
        build_course_dictionary(&split.right, config.row_tolerance, config.min_name_len);
    log::debug!("Dictionary size: {}", dictionary.len());

    let rows = inject_course_names(rows, &dictionary, ctx.catalog);
    trace.dictionary = dictionary;

    let rows = validate_rows(rows, config.percentage_tolerance);
    let (rows, duplicates) = deduplicate(rows);
    trace.duplicates = duplicates;

    let entries = assemble_entries(rows, config.anchor_confidence);
    log::info!("Extracted {} attendance entries", entries.len());

    Extraction { entries, trace }
}
