//! Attendance fraction and percentage detection.
//!
//! Both detectors scan every data-region token on their own; the column
//! zone is the only thing tying a value to a column.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::normalize::fraction_confusion;
use super::token::{x_ratio, Token};
use crate::config::ExtractorConfig;

static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").expect("valid fraction regex"));

static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("valid percentage regex"));

/// A `present/total` value found in the attendance column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceField {
    pub present: u32,
    pub total: u32,
    pub x_center: f32,
    pub y_center: f32,
}

/// A percentage found in the percentage column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageField {
    pub percentage: f64,
    pub x_center: f32,
    pub y_center: f32,
}

/// Something with a vertical position that can be matched to an anchor.
pub trait Positioned {
    fn y_center(&self) -> f32;
}

impl Positioned for AttendanceField {
    fn y_center(&self) -> f32 {
        self.y_center
    }
}

impl Positioned for PercentageField {
    fn y_center(&self) -> f32 {
        self.y_center
    }
}

/// Parses `present/total` after repairing letter/digit confusions.
///
/// Returns None when either count exceeds `max_count`.
pub fn parse_fraction(text: &str, max_count: u32) -> Option<(u32, u32)> {
    let repaired: String = text.to_uppercase().chars().map(fraction_confusion).collect();
    let caps = FRACTION.captures(&repaired)?;
    let present: u32 = caps[1].parse().ok()?;
    let total: u32 = caps[2].parse().ok()?;

    if present > max_count || total > max_count {
        return None;
    }
    Some((present, total))
}

/// Parses `NN%` or `NN.N%`. Returns None above `max_percentage`.
pub fn parse_percentage(text: &str, max_percentage: f64) -> Option<f64> {
    let caps = PERCENTAGE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    if value > max_percentage {
        return None;
    }
    Some(value)
}

pub fn detect_attendance_fields(
    tokens: &[Token],
    data_width: f32,
    config: &ExtractorConfig,
) -> Vec<AttendanceField> {
    tokens
        .iter()
        .filter(|t| config.zones.attendance.contains(x_ratio(t.x_center, data_width)))
        .filter_map(|t| {
            let (present, total) = parse_fraction(&t.text, config.max_class_count)?;
            Some(AttendanceField {
                present,
                total,
                x_center: t.x_center,
                y_center: t.y_center,
            })
        })
        .collect()
}

pub fn detect_percentage_fields(
    tokens: &[Token],
    data_width: f32,
    config: &ExtractorConfig,
) -> Vec<PercentageField> {
    tokens
        .iter()
        .filter(|t| config.zones.percentage.contains(x_ratio(t.x_center, data_width)))
        .filter_map(|t| {
            let percentage = parse_percentage(&t.text, config.max_percentage)?;
            Some(PercentageField {
                percentage,
                x_center: t.x_center,
                y_center: t.y_center,
            })
        })
        .collect()
}
