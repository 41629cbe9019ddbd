pub mod engine;
pub mod setup;

pub use engine::{OcrEngine, OcrLine, TesseractEngine};
pub use setup::{find_tessdata_dir, find_tesseract_executable};

use anyhow::{Context, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::catalog::CourseCatalog;
use crate::config::ExtractorConfig;
use crate::table::{extract_from_lines, AttendanceEntry, Extraction, ExtractionContext};

/// Saved OCR output for one image, so extraction can be replayed offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDump {
    #[serde(default)]
    pub image_width: Option<f32>,
    pub lines: Vec<OcrLine>,
}

impl OcrDump {
    /// Runs the engine on an image file and captures its output.
    pub fn capture(engine: &impl OcrEngine, path: &Path) -> Result<Self> {
        let image =
            image::open(path).context(format!("Failed to open image: {}", path.display()))?;
        Ok(Self {
            image_width: Some(image.width() as f32),
            lines: engine.recognize(&image)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read OCR dump: {}", path.display()))?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse OCR dump: {}", path.display()))
    }
}

/// A strategy that turns one screenshot into attendance entries.
pub trait AttendanceExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<Vec<AttendanceEntry>>;
}

/// The geometry-based strategy: OCR once, then rebuild rows from anchors.
///
/// Holds no per-image state; the engine is supplied by the caller.
pub struct AnchorExtractor<E: OcrEngine> {
    engine: E,
    config: ExtractorConfig,
    catalog: Option<CourseCatalog>,
}

impl<E: OcrEngine> AnchorExtractor<E> {
    pub fn new(engine: E, config: ExtractorConfig) -> Self {
        Self {
            engine,
            config,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, catalog: CourseCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Runs OCR and the full pipeline, keeping the trace.
    pub fn extract_traced(&self, image: &DynamicImage) -> Result<Extraction> {
        let lines = self.engine.recognize(image)?;
        log::debug!("OCR returned {} lines", lines.len());

        let mut ctx = ExtractionContext::new(&self.config);
        if let Some(catalog) = &self.catalog {
            ctx = ctx.with_catalog(catalog);
        }
        Ok(extract_from_lines(&lines, Some(image.width() as f32), ctx))
    }

    /// Loads an image from disk and extracts it.
    pub fn extract_path(&self, path: &Path) -> Result<Extraction> {
        let image =
            image::open(path).context(format!("Failed to open image: {}", path.display()))?;
        self.extract_traced(&image)
    }
}

impl<E: OcrEngine> AttendanceExtractor for AnchorExtractor<E> {
    fn extract(&self, image: &DynamicImage) -> Result<Vec<AttendanceEntry>> {
        Ok(self.extract_traced(image)?.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    /// Returns canned lines regardless of the image.
    struct FixedEngine(Vec<OcrLine>);

    impl OcrEngine for FixedEngine {
        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<OcrLine>> {
            Ok(self.0.clone())
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<OcrLine>> {
            Err(anyhow!("engine unavailable"))
        }
    }

    fn line_at(text: &str, x: f32, y: f32) -> OcrLine {
        OcrLine::from_rect(x - 20.0, y - 8.0, 40.0, 16.0, text, 0.9)
    }

    #[test]
    fn test_anchor_extractor_uses_image_width() {
        let engine = FixedEngine(vec![
            line_at("MATH101", 100.0, 200.0),
            line_at("LAB", 400.0, 200.0),
            line_at("38/52", 600.0, 201.0),
        ]);
        let extractor = AnchorExtractor::new(engine, ExtractorConfig::default());
        let image = DynamicImage::new_rgb8(1000, 400);

        let entries = extractor.extract(&image).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].course_code(), "MATH101");
        assert_eq!((entries[0].present(), entries[0].total()), (38, 52));
        assert_eq!(entries[0].percentage(), 73.1);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let extractor = AnchorExtractor::new(FailingEngine, ExtractorConfig::default());
        let image = DynamicImage::new_rgb8(10, 10);
        assert!(extractor.extract(&image).is_err());
    }

    #[test]
    fn test_dump_without_width() {
        let json = r#"{"lines": [{"quad": [[0,0],[10,0],[10,10],[0,10]], "text": "LAB", "confidence": 0.8}]}"#;
        let dump: OcrDump = serde_json::from_str(json).unwrap();
        assert_eq!(dump.image_width, None);
        assert_eq!(dump.lines[0].text, "LAB");
    }

    #[test]
    fn test_catalog_is_consulted() {
        let engine = FixedEngine(vec![
            line_at("MATH101", 100.0, 200.0),
            line_at("LECT", 400.0, 200.0),
        ]);
        let mut catalog = CourseCatalog::default();
        catalog.upsert("MATH101", "Engineering Mathematics", "EM");
        let extractor =
            AnchorExtractor::new(engine, ExtractorConfig::default()).with_catalog(catalog);

        let entries = extractor.extract(&DynamicImage::new_rgb8(1000, 400)).unwrap();
        assert_eq!(entries[0].course_name(), "Engineering Mathematics");
    }
}
