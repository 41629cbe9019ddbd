//! Builds the course_code -> course_name legend from the right region.

use std::collections::BTreeMap;

use super::normalize::{find_course_code, normalize_course_code};
use super::token::Token;

/// Normalized course code -> course name.
pub type CourseDictionary = BTreeMap<String, String>;

/// Groups tokens into rows by y proximity.
///
/// A token joins the first row whose seed y is within `tolerance`,
/// otherwise it seeds a new row. Rows come back top to bottom, tokens
/// within a row left to right.
pub fn cluster_rows(tokens: &[Token], tolerance: f32) -> Vec<Vec<Token>> {
    let mut rows: Vec<(f32, Vec<Token>)> = Vec::new();

    for token in tokens {
        match rows
            .iter_mut()
            .find(|(seed_y, _)| (token.y_center - *seed_y).abs() <= tolerance)
        {
            Some((_, row)) => row.push(token.clone()),
            None => rows.push((token.y_center, vec![token.clone()])),
        }
    }

    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    rows.into_iter()
        .map(|(_, mut row)| {
            row.sort_by(|a, b| a.x_center.total_cmp(&b.x_center));
            row
        })
        .collect()
}

fn is_header_row(row: &[Token]) -> bool {
    let text = row
        .iter()
        .map(|t| t.text.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ");
    text.contains("COURSE CODE") || text.contains("COURSE NAME")
}

/// Extracts code -> name pairs from the legend table.
///
/// In each non-header row the first course-code token gives the key and the
/// longest text longer than `min_name_len` chars gives the name. The first
/// occurrence of a code wins.
pub fn build_course_dictionary(
    tokens: &[Token],
    row_tolerance: f32,
    min_name_len: usize,
) -> CourseDictionary {
    let mut dictionary = CourseDictionary::new();

    for row in cluster_rows(tokens, row_tolerance) {
        if is_header_row(&row) {
            continue;
        }

        let Some(code) = row
            .iter()
            .filter_map(|t| find_course_code(&t.text))
            .map(|raw| normalize_course_code(&raw))
            .find(|code| !code.is_empty())
        else {
            continue;
        };

        let mut name: Option<String> = None;
        for token in &row {
            let candidate = token.text.trim();
            let len = candidate.chars().count();
            let longest = name.as_ref().map_or(0, |n| n.chars().count());
            if len > min_name_len && len > longest {
                name = Some(candidate.to_uppercase());
            }
        }
        let Some(name) = name else {
            continue;
        };

        if dictionary.contains_key(&code) {
            log::debug!("Dictionary: duplicate {} ignored", code);
            continue;
        }
        log::info!("Dictionary: {} -> {}", code, name);
        dictionary.insert(code, name);
    }

    dictionary
}
