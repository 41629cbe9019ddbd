//! Tokens and the left/right region split.

use serde::Serialize;

use super::normalize::find_course_code;
use crate::ocr::OcrLine;

/// One OCR fragment with its center point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    pub confidence: f32,
    pub x_center: f32,
    pub y_center: f32,
    pub quad: [[f32; 2]; 4],
}

impl Token {
    /// Builds a token from a box, centering on the mean of its corners.
    pub fn from_line(line: &OcrLine) -> Self {
        let x_center = line.quad.iter().map(|p| p[0]).sum::<f32>() / 4.0;
        let y_center = line.quad.iter().map(|p| p[1]).sum::<f32>() / 4.0;
        Self {
            text: line.text.trim().to_string(),
            confidence: line.confidence,
            x_center,
            y_center,
            quad: line.quad,
        }
    }
}

/// All tokens of one image plus the width used for zone ratios.
#[derive(Debug, Clone)]
pub struct TokenPage {
    pub tokens: Vec<Token>,
    pub image_width: f32,
}

/// Converts raw OCR lines into tokens.
///
/// No filtering happens here. If `image_width` is missing or not positive,
/// the widest box corner stands in for it.
pub fn tokenize(lines: &[OcrLine], image_width: Option<f32>) -> TokenPage {
    let tokens: Vec<Token> = lines.iter().map(Token::from_line).collect();

    let image_width = match image_width {
        Some(w) if w > 0.0 => w,
        _ => lines
            .iter()
            .flat_map(|line| line.quad.iter().map(|p| p[0]))
            .fold(0.0, f32::max),
    };

    TokenPage {
        tokens,
        image_width,
    }
}

/// Normalized horizontal position, 0.0 when the width is degenerate.
pub fn x_ratio(x_center: f32, width: f32) -> f32 {
    if width > 0.0 { x_center / width } else { 0.0 }
}

/// Result of splitting a page into the attendance table and the legend.
#[derive(Debug, Clone)]
pub struct RegionSplit {
    /// Attendance data tokens
    pub left: Vec<Token>,
    /// Course-name legend tokens
    pub right: Vec<Token>,
    /// x coordinate the split was made at
    pub split_x: f32,
    /// Width the column zones are measured against
    pub data_width: f32,
    /// Whether the right region holds a course legend
    pub has_legend: bool,
}

/// Splits tokens into the attendance region and the legend region.
///
/// The split is at `image_width * threshold`; if either side ends up empty
/// the median x_center is used instead. When the right side has no
/// course-code token there is no legend, so its tokens go back to the data
/// region and zones are measured against the full image width.
pub fn split_regions(tokens: &[Token], image_width: f32, threshold: f32) -> RegionSplit {
    let mut split_x = image_width * threshold;
    let (mut left, mut right) = partition_at(tokens, split_x);

    if (left.is_empty() || right.is_empty()) && !tokens.is_empty() {
        let mut xs: Vec<f32> = tokens.iter().map(|t| t.x_center).collect();
        xs.sort_by(f32::total_cmp);
        split_x = xs[xs.len() / 2];
        (left, right) = partition_at(tokens, split_x);
        log::debug!("Region split fell back to median x={:.1}", split_x);
    }

    let has_legend = right.iter().any(|t| find_course_code(&t.text).is_some());
    if has_legend {
        RegionSplit {
            left,
            right,
            split_x,
            data_width: split_x,
            has_legend,
        }
    } else {
        log::debug!("No course legend on the right; treating the whole page as data");
        RegionSplit {
            left: tokens.to_vec(),
            right: Vec::new(),
            split_x,
            data_width: image_width,
            has_legend,
        }
    }
}

fn partition_at(tokens: &[Token], split_x: f32) -> (Vec<Token>, Vec<Token>) {
    tokens.iter().cloned().partition(|t| t.x_center < split_x)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Token centered at (x, y) with a 20px square box.
    pub fn make_token(text: &str, x: f32, y: f32) -> Token {
        Token {
            text: text.to_string(),
            confidence: 0.9,
            x_center: x,
            y_center: y,
            quad: [
                [x - 10.0, y - 10.0],
                [x + 10.0, y - 10.0],
                [x + 10.0, y + 10.0],
                [x - 10.0, y + 10.0],
            ],
        }
    }

    #[test]
    fn test_tokenize_centers_and_trims() {
        let lines = vec![OcrLine::from_rect(100.0, 200.0, 40.0, 10.0, "  CSUC201 ", 0.4)];
        let page = tokenize(&lines, Some(1000.0));

        assert_eq!(page.image_width, 1000.0);
        assert_eq!(page.tokens.len(), 1);
        assert_eq!(page.tokens[0].text, "CSUC201");
        assert_eq!(page.tokens[0].x_center, 120.0);
        assert_eq!(page.tokens[0].y_center, 205.0);
        // Low confidence passes through untouched
        assert_eq!(page.tokens[0].confidence, 0.4);
    }

    #[test]
    fn test_tokenize_width_falls_back_to_widest_box() {
        let lines = vec![
            OcrLine::from_rect(10.0, 0.0, 50.0, 10.0, "a", 0.9),
            OcrLine::from_rect(700.0, 0.0, 80.0, 10.0, "b", 0.9),
        ];
        assert_eq!(tokenize(&lines, None).image_width, 780.0);
        assert_eq!(tokenize(&lines, Some(0.0)).image_width, 780.0);
    }

    #[test]
    fn test_x_ratio_zero_width() {
        assert_eq!(x_ratio(100.0, 0.0), 0.0);
        assert_eq!(x_ratio(250.0, 1000.0), 0.25);
    }

    #[test]
    fn test_split_with_legend() {
        let tokens = vec![
            make_token("CSUC201", 50.0, 200.0),
            make_token("42/59", 300.0, 200.0),
            make_token("CSUC201", 600.0, 200.0),
            make_token("DATA STRUCTURES", 800.0, 200.0),
        ];
        let split = split_regions(&tokens, 1000.0, 0.52);

        assert!(split.has_legend);
        assert_eq!(split.split_x, 520.0);
        assert_eq!(split.data_width, 520.0);
        assert_eq!(split.left.len(), 2);
        assert_eq!(split.right.len(), 2);
    }

    #[test]
    fn test_split_without_legend_keeps_everything() {
        let tokens = vec![
            make_token("CSUC201", 100.0, 200.0),
            make_token("LECT", 400.0, 203.0),
            make_token("42/59", 600.0, 202.0),
            make_token("71.2%", 900.0, 201.0),
        ];
        let split = split_regions(&tokens, 1000.0, 0.52);

        assert!(!split.has_legend);
        assert_eq!(split.left.len(), 4);
        assert!(split.right.is_empty());
        assert_eq!(split.data_width, 1000.0);
    }

    #[test]
    fn test_split_median_fallback() {
        // Everything left of the threshold: fall back to the median
        let tokens = vec![
            make_token("CSUC201", 50.0, 200.0),
            make_token("LECT", 100.0, 200.0),
            make_token("MATH101", 300.0, 200.0),
            make_token("CALCULUS III", 400.0, 200.0),
        ];
        let split = split_regions(&tokens, 1000.0, 0.52);

        assert_eq!(split.split_x, 300.0);
        assert!(split.has_legend);
        assert_eq!(split.left.len(), 2);
        assert_eq!(split.right.len(), 2);
    }

    #[test]
    fn test_split_empty_page() {
        let split = split_regions(&[], 1000.0, 0.52);
        assert!(split.left.is_empty());
        assert!(split.right.is_empty());
    }
}
