//! Name injection, consistency checks and duplicate-anchor merging.
//!
//! None of these steps drop a row. Problems are logged and the observed
//! values are kept as-is.

use std::collections::HashMap;

use super::dictionary::CourseDictionary;
use super::entry::ClassType;
use super::matcher::RowDraft;
use crate::catalog::CourseCatalog;

/// Name used when neither the legend nor the catalog knows a course.
pub const UNKNOWN_COURSE: &str = "UNKNOWN";

/// A row with every value filled in, ready for dedup and assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub course_code: String,
    pub course_name: String,
    pub class_type: ClassType,
    pub present: u32,
    pub total: u32,
    pub percentage: f64,
    pub y_center: f32,
}

/// Attaches course names: legend first, then the catalog, then UNKNOWN.
pub fn inject_course_names(
    rows: Vec<RowDraft>,
    dictionary: &CourseDictionary,
    catalog: Option<&CourseCatalog>,
) -> Vec<RowDraft> {
    rows.into_iter()
        .map(|mut row| {
            let name = dictionary
                .get(&row.course_code)
                .cloned()
                .or_else(|| {
                    catalog
                        .and_then(|c| c.name_for(&row.course_code))
                        .map(str::to_string)
                });

            row.course_name = Some(match name {
                Some(name) => name,
                None => {
                    log::warn!(
                        "Dictionary miss: {} (row kept as {})",
                        row.course_code,
                        UNKNOWN_COURSE
                    );
                    UNKNOWN_COURSE.to_string()
                }
            });
            row
        })
        .collect()
}

/// `present / total` as a percentage rounded to one decimal.
pub fn computed_percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (present as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Fills missing values and logs consistency problems.
pub fn validate_rows(rows: Vec<RowDraft>, tolerance: f64) -> Vec<ValidatedRow> {
    rows.into_iter()
        .map(|row| {
            let (present, total) = match (row.present, row.total) {
                (Some(present), Some(total)) => (present, total),
                _ => {
                    log::warn!(
                        "Missing attendance for {} {}",
                        row.course_code,
                        row.class_type
                    );
                    (0, 0)
                }
            };

            let percentage = match row.percentage {
                Some(percentage) => percentage,
                None => {
                    log::warn!(
                        "Missing percentage for {} {}, computed from attendance",
                        row.course_code,
                        row.class_type
                    );
                    computed_percentage(present, total)
                }
            };

            if total > 0 && present > total {
                log::warn!(
                    "Invalid: present > total for {} {}: {}/{}",
                    row.course_code,
                    row.class_type,
                    present,
                    total
                );
            }

            if total > 0 {
                let expected = present as f64 / total as f64 * 100.0;
                if (percentage - expected).abs() > tolerance {
                    log::warn!(
                        "Percentage mismatch for {} {}: {}% vs expected {:.1}%",
                        row.course_code,
                        row.class_type,
                        percentage,
                        expected
                    );
                }
            }

            ValidatedRow {
                course_code: row.course_code,
                course_name: row
                    .course_name
                    .unwrap_or_else(|| UNKNOWN_COURSE.to_string()),
                class_type: row.class_type,
                present,
                total,
                percentage,
                y_center: row.y_center,
            }
        })
        .collect()
}

/// Returns true if `candidate` should replace `existing` for the same key.
///
/// A non-zero total beats a zero total; otherwise the row further down the
/// page wins.
fn prefers(candidate: &ValidatedRow, existing: &ValidatedRow) -> bool {
    match (candidate.total > 0, existing.total > 0) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.y_center > existing.y_center,
    }
}

/// Merges rows sharing (course_code, class_type), in encounter order.
///
/// Returns the surviving rows and the number of duplicates resolved.
pub fn deduplicate(rows: Vec<ValidatedRow>) -> (Vec<ValidatedRow>, usize) {
    let mut kept: Vec<ValidatedRow> = Vec::new();
    let mut index: HashMap<(String, ClassType), usize> = HashMap::new();
    let mut duplicates = 0;

    for row in rows {
        let key = (row.course_code.clone(), row.class_type);
        match index.get(&key) {
            Some(&slot) => {
                duplicates += 1;
                if prefers(&row, &kept[slot]) {
                    log::info!(
                        "Duplicate resolved: {} {} - chose total={} at y={:.1}",
                        row.course_code,
                        row.class_type,
                        row.total,
                        row.y_center
                    );
                    kept[slot] = row;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(row);
            }
        }
    }

    (kept, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_draft(present: Option<u32>, total: Option<u32>, percentage: Option<f64>) -> RowDraft {
        RowDraft {
            course_code: "CSUC201".to_string(),
            class_type: ClassType::Lect,
            present,
            total,
            percentage,
            course_name: None,
            y_center: 200.0,
        }
    }

    fn make_row(code: &str, class_type: ClassType, total: u32, y: f32) -> ValidatedRow {
        ValidatedRow {
            course_code: code.to_string(),
            course_name: UNKNOWN_COURSE.to_string(),
            class_type,
            present: total / 2,
            total,
            percentage: 50.0,
            y_center: y,
        }
    }

    #[test]
    fn test_inject_prefers_dictionary_then_catalog() {
        let mut dictionary = CourseDictionary::new();
        dictionary.insert("CSUC201".to_string(), "DATA STRUCTURES".to_string());
        let mut catalog = CourseCatalog::default();
        catalog.upsert("CSUC201", "Catalog Name", "");
        catalog.upsert("MATH101", "Engineering Mathematics", "EM");

        let mut other = make_draft(None, None, None);
        other.course_code = "MATH101".to_string();
        let mut missing = make_draft(None, None, None);
        missing.course_code = "PHYS101".to_string();

        let rows = inject_course_names(
            vec![make_draft(None, None, None), other, missing],
            &dictionary,
            Some(&catalog),
        );

        assert_eq!(rows[0].course_name.as_deref(), Some("DATA STRUCTURES"));
        assert_eq!(rows[1].course_name.as_deref(), Some("Engineering Mathematics"));
        assert_eq!(rows[2].course_name.as_deref(), Some(UNKNOWN_COURSE));
    }

    #[test]
    fn test_inject_without_catalog() {
        let rows = inject_course_names(
            vec![make_draft(None, None, None)],
            &CourseDictionary::new(),
            None,
        );
        assert_eq!(rows[0].course_name.as_deref(), Some(UNKNOWN_COURSE));
    }

    #[test]
    fn test_computed_percentage() {
        assert_eq!(computed_percentage(42, 59), 71.2);
        assert_eq!(computed_percentage(38, 52), 73.1);
        assert_eq!(computed_percentage(5, 0), 0.0);
    }

    #[test]
    fn test_validate_computes_missing_percentage() {
        let rows = validate_rows(vec![make_draft(Some(42), Some(59), None)], 3.0);
        assert_eq!(rows[0].percentage, 71.2);
        assert_eq!(rows[0].course_name, UNKNOWN_COURSE);
    }

    #[test]
    fn test_validate_defaults_missing_attendance() {
        let rows = validate_rows(vec![make_draft(None, None, Some(80.0))], 3.0);
        assert_eq!((rows[0].present, rows[0].total), (0, 0));
        // Observed percentage is kept
        assert_eq!(rows[0].percentage, 80.0);

        let rows = validate_rows(vec![make_draft(None, None, None)], 3.0);
        assert_eq!(rows[0].percentage, 0.0);
    }

    #[test]
    fn test_validate_keeps_inconsistent_values() {
        let rows = validate_rows(
            vec![
                make_draft(Some(60), Some(59), None),
                make_draft(Some(42), Some(59), Some(90.0)),
            ],
            3.0,
        );
        assert_eq!((rows[0].present, rows[0].total), (60, 59));
        assert_eq!(rows[0].percentage, 101.7);
        assert_eq!(rows[1].percentage, 90.0);
    }

    #[test]
    fn test_dedup_prefers_nonzero_total() {
        let rows = vec![
            make_row("MATH101", ClassType::Lab, 52, 100.0),
            make_row("MATH101", ClassType::Lab, 0, 300.0),
        ];
        let (kept, duplicates) = deduplicate(rows);
        assert_eq!(duplicates, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].total, 52);

        let rows = vec![
            make_row("MATH101", ClassType::Lab, 0, 100.0),
            make_row("MATH101", ClassType::Lab, 52, 50.0),
        ];
        let (kept, _) = deduplicate(rows);
        assert_eq!(kept[0].total, 52);
    }

    #[test]
    fn test_dedup_tie_prefers_lower_on_page() {
        let rows = vec![
            make_row("CSUC201", ClassType::Lect, 40, 300.0),
            make_row("CSUC201", ClassType::Lect, 44, 120.0),
            make_row("CSUC201", ClassType::Lect, 48, 400.0),
        ];
        let (kept, duplicates) = deduplicate(rows);
        assert_eq!(duplicates, 2);
        assert_eq!(kept[0].total, 48);
    }

    #[test]
    fn test_dedup_keeps_lect_and_lab_apart() {
        let rows = vec![
            make_row("CSUC201", ClassType::Lect, 40, 100.0),
            make_row("CSUC201", ClassType::Lab, 20, 150.0),
        ];
        let (kept, duplicates) = deduplicate(rows);
        assert_eq!(duplicates, 0);
        assert_eq!(kept.len(), 2);
    }
}
