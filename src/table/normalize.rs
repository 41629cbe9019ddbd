//! Course-code pattern matching and OCR confusion repair.

use regex::Regex;
use std::sync::LazyLock;

/// 3-4 letters followed by 3 digits, matched against uppercased text.
static COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{3,4}\d{3}").expect("valid course code regex"));

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9]").expect("valid alnum regex"));

/// Maps a letter commonly misread for a digit inside a course number.
fn course_digit_confusion(c: char) -> char {
    match c {
        'O' | 'D' | 'Q' => '0',
        'I' | 'L' => '1',
        other => other,
    }
}

/// Maps letters commonly misread for digits inside an attendance fraction.
pub fn fraction_confusion(c: char) -> char {
    match c {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    }
}

/// Returns the first course-code-looking substring of `text`, uppercased.
pub fn find_course_code(text: &str) -> Option<String> {
    COURSE_CODE
        .find(&text.to_uppercase())
        .map(|m| m.as_str().to_string())
}

/// Normalizes a raw course code to four letters plus three digits.
///
/// The part left of any `/` is kept, non-alphanumerics are dropped, the
/// leading letter run (capped at four) is kept as the prefix and the rest
/// is repaired digit by digit. The number is padded or truncated to three
/// digits. Inputs without at least two leading letters come back cleaned
/// but otherwise untouched (max 7 chars).
pub fn normalize_course_code(raw: &str) -> String {
    let left = raw.split('/').next().unwrap_or_default().to_uppercase();
    let cleaned = NON_ALNUM.replace_all(&left, "").to_string();
    if cleaned.is_empty() {
        return cleaned;
    }

    let letter_run = cleaned.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if letter_run < 2 {
        return cleaned.chars().take(7).collect();
    }

    let prefix_len = letter_run.min(4);
    let letters: String = cleaned.chars().take(prefix_len).collect();
    let mut digits: String = cleaned
        .chars()
        .skip(prefix_len)
        .map(course_digit_confusion)
        .filter(|c| c.is_ascii_digit())
        .take(3)
        .collect();
    while digits.len() < 3 {
        digits.push('0');
    }

    format!("{}{}", letters, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_already_clean() {
        assert_eq!(normalize_course_code("CSUC201"), "CSUC201");
        assert_eq!(normalize_course_code("csuc201"), "CSUC201");
    }

    #[test]
    fn test_normalize_confusions() {
        assert_eq!(normalize_course_code("CSUCO01"), "CSUC001");
        assert_eq!(normalize_course_code("CSUCIO1"), "CSUC101");
        assert_eq!(normalize_course_code("CSUC2O1"), "CSUC201");
        assert_eq!(normalize_course_code("MATH1O1"), "MATH101");
        assert_eq!(normalize_course_code("CSUCD0Q"), "CSUC000");
        assert_eq!(normalize_course_code("CSUCL2I"), "CSUC121");
    }

    #[test]
    fn test_normalize_drops_suffix_and_punctuation() {
        assert_eq!(normalize_course_code("CEUC201/FSE"), "CEUC201");
        assert_eq!(normalize_course_code("CE-UC 201"), "CEUC201");
    }

    #[test]
    fn test_normalize_pads_and_truncates_digits() {
        assert_eq!(normalize_course_code("CSUC2"), "CSUC200");
        assert_eq!(normalize_course_code("CSUC20145"), "CSUC201");
        assert_eq!(normalize_course_code("ABC"), "ABC000");
    }

    #[test]
    fn test_normalize_three_letter_prefix() {
        assert_eq!(normalize_course_code("ABC123"), "ABC123");
    }

    #[test]
    fn test_normalize_degenerate_inputs() {
        assert_eq!(normalize_course_code(""), "");
        assert_eq!(normalize_course_code("//"), "");
        assert_eq!(normalize_course_code("12345678"), "1234567");
        assert_eq!(normalize_course_code("A123"), "A123");
    }

    #[test]
    fn test_find_course_code() {
        assert_eq!(find_course_code("csuc201"), Some("CSUC201".to_string()));
        assert_eq!(find_course_code("CEUC201/FSE"), Some("CEUC201".to_string()));
        assert_eq!(find_course_code("LECT"), None);
        assert_eq!(find_course_code("42/59"), None);
    }

    #[test]
    fn test_fraction_confusion() {
        let fixed: String = "4O/5I".chars().map(fraction_confusion).collect();
        assert_eq!(fixed, "40/51");
    }
}
