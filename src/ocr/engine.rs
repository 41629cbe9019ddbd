use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};

/// One recognized text fragment: quadrilateral box, text and confidence (0-1).
///
/// Corner order follows the usual detector convention: top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub quad: [[f32; 2]; 4],
    pub text: String,
    pub confidence: f32,
}

impl OcrLine {
    /// Builds a line from an axis-aligned rectangle.
    pub fn from_rect(left: f32, top: f32, width: f32, height: f32, text: &str, confidence: f32) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            quad: [[left, top], [right, top], [right, bottom], [left, bottom]],
            text: text.to_string(),
            confidence,
        }
    }
}

/// A black-box text detector/recognizer.
///
/// Implementations may be reused across calls; each call's output is
/// treated as complete and final.
pub trait OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>>;
}

/// Runs the Tesseract CLI and turns its TSV output into boxed lines.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
}

impl TesseractEngine {
    /// Locates Tesseract on this machine.
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self> {
        let executable = match explicit {
            Some(path) => path,
            None => find_tesseract_executable()?,
        };
        Ok(Self {
            executable,
            tessdata: find_tessdata_dir().ok(),
            language: "eng".to_string(),
        })
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        image
            .save(temp_input.path())
            .context("Failed to write image for Tesseract")?;

        // Tesseract appends .tsv to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        let output = command
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg("11") // Sparse text: table cells come back as separate blocks
            .arg("tsv")
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

/// A word from the TSV with its pixel rectangle.
#[derive(Debug, Clone)]
struct TsvWord {
    text: String,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    confidence: f32,
}

/// Words sharing a (block, paragraph, line) key, in reading order.
#[derive(Debug, Default)]
struct LineGroup {
    key: (i32, i32, i32),
    words: Vec<TsvWord>,
}

/// Parses Tesseract TSV output into boxed lines.
///
/// Words are grouped by (block, paragraph, line). A group is split again
/// where the gap to the next word is wider than twice the line height, so
/// neighbouring table cells on one text line stay separate fragments.
fn parse_tsv_output(tsv: &str) -> Vec<OcrLine> {
    let mut groups: Vec<LineGroup> = Vec::new();

    for line in tsv.lines().skip(1) {
        // Skip header
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);
        if level != 5 {
            continue;
        }
        let text = fields[11].trim();
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        let word = TsvWord {
            text: text.to_string(),
            left: fields[6].parse().unwrap_or(0.0),
            top: fields[7].parse().unwrap_or(0.0),
            width: fields[8].parse().unwrap_or(0.0),
            height: fields[9].parse().unwrap_or(0.0),
            confidence: conf,
        };

        match groups.last_mut() {
            Some(group) if group.key == key => group.words.push(word),
            _ => groups.push(LineGroup {
                key,
                words: vec![word],
            }),
        }
    }

    groups
        .into_iter()
        .flat_map(|group| split_on_gaps(group.words))
        .filter_map(|words| merge_words(&words))
        .collect()
}

fn split_on_gaps(words: Vec<TsvWord>) -> Vec<Vec<TsvWord>> {
    let mut runs: Vec<Vec<TsvWord>> = Vec::new();

    for word in words {
        let starts_new = match runs.last().and_then(|run| run.last()) {
            Some(prev) => {
                let gap = word.left - (prev.left + prev.width);
                let line_height = prev.height.max(word.height);
                gap > line_height * 2.0
            }
            None => true,
        };

        if starts_new {
            runs.push(vec![word]);
        } else if let Some(run) = runs.last_mut() {
            run.push(word);
        }
    }

    runs
}

fn merge_words(words: &[TsvWord]) -> Option<OcrLine> {
    let first = words.first()?;

    let mut left = first.left;
    let mut top = first.top;
    let mut right = first.left + first.width;
    let mut bottom = first.top + first.height;
    let mut conf_sum = 0.0;

    for word in words {
        left = left.min(word.left);
        top = top.min(word.top);
        right = right.max(word.left + word.width);
        bottom = bottom.max(word.top + word.height);
        conf_sum += word.confidence;
    }

    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let confidence = (conf_sum / words.len() as f32 / 100.0).clamp(0.0, 1.0);

    Some(OcrLine::from_rect(left, top, right - left, bottom - top, &text, confidence))
}
