//! Anchor detection: a course code paired with a nearby class type.
//!
//! Rows are never reconstructed directly. A logical row exists only where a
//! course code in the course-code zone has a LECT/LAB token on the same
//! horizontal band; every other field attaches to these anchors later.

use serde::Serialize;

use super::entry::ClassType;
use super::normalize::{find_course_code, normalize_course_code};
use super::token::{x_ratio, Token};
use crate::config::ExtractorConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub course_code: String,
    pub class_type: ClassType,
    pub x_center: f32,
    pub y_center: f32,
}

/// Finds every (course_code, class_type) pair in the data region.
///
/// Duplicates are kept; they are merged after validation.
pub fn detect_anchors(tokens: &[Token], data_width: f32, config: &ExtractorConfig) -> Vec<Anchor> {
    let mut anchors = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let Some(raw_code) = find_course_code(&token.text) else {
            continue;
        };

        if !config
            .zones
            .course_code
            .contains(x_ratio(token.x_center, data_width))
        {
            continue;
        }

        let class_type = tokens
            .iter()
            .enumerate()
            .filter(|(other_idx, _)| *other_idx != idx)
            .filter(|(_, other)| (other.y_center - token.y_center).abs() <= config.y_tolerance)
            .find_map(|(_, other)| ClassType::detect(&other.text));

        let Some(class_type) = class_type else {
            log::debug!(
                "Course code {} at y={:.1} has no class type nearby, skipped",
                raw_code,
                token.y_center
            );
            continue;
        };

        log::info!(
            "Anchor detected: {} {} at y={:.1}",
            raw_code,
            class_type,
            token.y_center
        );
        anchors.push(Anchor {
            course_code: normalize_course_code(&raw_code),
            class_type,
            x_center: token.x_center,
            y_center: token.y_center,
        });
    }

    anchors
}
