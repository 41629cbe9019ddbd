//! Attaches detected fields to anchors by vertical distance.

use super::anchor::Anchor;
use super::entry::ClassType;
use super::field::{AttendanceField, PercentageField, Positioned};

/// An anchor with whatever fields could be attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDraft {
    pub course_code: String,
    pub class_type: ClassType,
    pub present: Option<u32>,
    pub total: Option<u32>,
    pub percentage: Option<f64>,
    pub course_name: Option<String>,
    pub y_center: f32,
}

/// Returns the field closest in y to `y`, if it is strictly within `tolerance`.
///
/// Ties keep the earliest field.
pub fn nearest_by_y<T: Positioned>(fields: &[T], y: f32, tolerance: f32) -> Option<&T> {
    let mut best: Option<(&T, f32)> = None;

    for field in fields {
        let distance = (field.y_center() - y).abs();
        if distance >= tolerance {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((field, distance)),
        }
    }

    best.map(|(field, _)| field)
}

/// Greedy per-anchor nearest-neighbour matching.
///
/// Each anchor independently picks its closest attendance and percentage
/// field; fields no anchor picks are dropped.
pub fn match_fields(
    anchors: &[Anchor],
    attendance: &[AttendanceField],
    percentages: &[PercentageField],
    y_tolerance: f32,
) -> Vec<RowDraft> {
    anchors
        .iter()
        .map(|anchor| {
            let fraction = nearest_by_y(attendance, anchor.y_center, y_tolerance);
            let percentage = nearest_by_y(percentages, anchor.y_center, y_tolerance);

            RowDraft {
                course_code: anchor.course_code.clone(),
                class_type: anchor.class_type,
                present: fraction.map(|f| f.present),
                total: fraction.map(|f| f.total),
                percentage: percentage.map(|p| p.percentage),
                course_name: None,
                y_center: anchor.y_center,
            }
        })
        .collect()
}
