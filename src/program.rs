//! Canonical academic program names.
//!
//! Roster majors arrive in inconsistent shapes such as
//! `"COT4400.001F24 [6M]Cybersecurity"` or `"[4R]Computer Science"`.
//! [`normalize_program`] reduces them to a stable display name so submissions
//! can be grouped per program.

use std::iter::Peekable;
use std::str::CharIndices;

/// Placeholder for submissions whose program cannot be resolved.
pub const UNKNOWN_PROGRAM: &str = "Unknown Program";

/// Placeholder the roster upload emits for students without a listed major.
pub const UNKNOWN_MAJOR: &str = "Unknown Major";

/// Keyword → canonical name, matched case-insensitively as a substring of the
/// cleaned major. The first matching entry wins. Keywords are pairwise
/// disjoint so the order never changes a result.
pub static PROGRAM_KEYWORDS: &[(&str, &str)] = &[
    ("computer science", "Computer Science"),
    ("computer engineering", "Computer Engineering"),
    ("mechanical engineering", "Mechanical Engineering"),
    ("cybersecurity", "Cybersecurity"),
    ("biomedical science", "Biomedical Sciences"),
    ("data intelligence", "Data Intelligence"),
    ("economics", "Economics"),
];

/// Maps a raw major string to its canonical program name.
///
/// Missing, blank and placeholder inputs yield [`UNKNOWN_PROGRAM`]. Otherwise a
/// leading course/section code and a leading bracketed cohort tag are removed,
/// and the remainder is matched against [`PROGRAM_KEYWORDS`]. Unmatched
/// majors are returned cleaned but otherwise verbatim.
pub fn normalize_program(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNKNOWN_PROGRAM.to_string();
    };
    if raw == UNKNOWN_PROGRAM || raw == UNKNOWN_MAJOR {
        return UNKNOWN_PROGRAM.to_string();
    }

    let cleaned = strip_cohort_tag(strip_course_code(raw).trim()).trim();
    if cleaned.is_empty() {
        return UNKNOWN_PROGRAM.to_string();
    }

    let lower = cleaned.to_lowercase();
    PROGRAM_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| cleaned.to_string())
}

/// `true` when `program` is the unresolved placeholder.
pub fn is_unknown(program: &str) -> bool {
    program == UNKNOWN_PROGRAM
}

/// Removes a leading section code of the form `ABC1234.001F24 `: three
/// uppercase letters, four digits, a dot, digits, one uppercase letter,
/// digits, then at least one whitespace character. Returns `s` untouched when
/// the prefix is not present.
fn strip_course_code(s: &str) -> &str {
    let mut chars = s.char_indices().peekable();

    let matched = take_run(&mut chars, char::is_ascii_uppercase) == 3
        && take_run(&mut chars, char::is_ascii_digit) == 4
        && chars.next_if(|&(_, c)| c == '.').is_some()
        && take_run(&mut chars, char::is_ascii_digit) > 0
        && chars.next_if(|(_, c)| c.is_ascii_uppercase()).is_some()
        && take_run(&mut chars, char::is_ascii_digit) > 0
        && take_run(&mut chars, |c| c.is_whitespace()) > 0;
    if !matched {
        return s;
    }

    match chars.peek() {
        Some(&(idx, _)) => &s[idx..],
        None => "",
    }
}

fn take_run(chars: &mut Peekable<CharIndices<'_>>, pred: fn(&char) -> bool) -> usize {
    let mut n = 0;
    while chars.next_if(|(_, c)| pred(c)).is_some() {
        n += 1;
    }
    n
}

/// Removes a leading `[...]` tag (up to the first closing bracket) and any
/// whitespace after it.
fn strip_cohort_tag(s: &str) -> &str {
    if !s.starts_with('[') {
        return s;
    }
    match s.find(']') {
        Some(end) => s[end + 1..].trim_start(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_program(Some(s))
    }

    #[test]
    fn test_course_code_and_cohort_tag_are_stripped() {
        assert_eq!(norm("COT4400.001F24 [6M]Cybersecurity"), "Cybersecurity");
        assert_eq!(norm("[4R]Computer Science"), "Computer Science");
        assert_eq!(norm("COP3502.012S25   Economics"), "Economics");
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_and_anywhere() {
        assert_eq!(norm("BS COMPUTER SCIENCE"), "Computer Science");
        assert_eq!(norm("[GD] Biomedical Sciences (Pre-Med)"), "Biomedical Sciences");
        assert_eq!(norm("Applied data intelligence"), "Data Intelligence");
        assert_eq!(norm("mechanical engineering"), "Mechanical Engineering");
        assert_eq!(norm("Computer Engineering"), "Computer Engineering");
    }

    #[test]
    fn test_unmatched_major_is_returned_cleaned() {
        assert_eq!(norm("COT4400.001F24 [6M] Physics "), "Physics");
        assert_eq!(norm("  Undeclared  "), "Undeclared");
    }

    #[test]
    fn test_sentinel_inputs() {
        assert_eq!(normalize_program(None), UNKNOWN_PROGRAM);
        assert_eq!(norm(""), UNKNOWN_PROGRAM);
        assert_eq!(norm("   "), UNKNOWN_PROGRAM);
        assert_eq!(norm("Unknown Major"), UNKNOWN_PROGRAM);
        assert_eq!(norm("Unknown Program"), UNKNOWN_PROGRAM);
        assert_eq!(norm("[6M]"), UNKNOWN_PROGRAM);
    }

    #[test]
    fn test_partial_course_code_is_not_stripped() {
        // lowercase department, missing section letter, no trailing space
        assert_eq!(strip_course_code("cot4400.001F24 Economics"), "cot4400.001F24 Economics");
        assert_eq!(strip_course_code("COT4400.00124 Economics"), "COT4400.00124 Economics");
        assert_eq!(strip_course_code("COT4400.001F24"), "COT4400.001F24");
        assert_eq!(strip_course_code("COT4400.001F24 "), "");
    }

    #[test]
    fn test_cohort_tag_stops_at_first_bracket() {
        assert_eq!(strip_cohort_tag("[6M] [X]Cybersecurity"), "[X]Cybersecurity");
        assert_eq!(strip_cohort_tag("[unterminated Economics"), "[unterminated Economics");
        assert_eq!(strip_cohort_tag("Economics [6M]"), "Economics [6M]");
    }

    #[test]
    fn test_keywords_are_pairwise_disjoint() {
        for (i, (a, _)) in PROGRAM_KEYWORDS.iter().enumerate() {
            for (j, (b, _)) in PROGRAM_KEYWORDS.iter().enumerate() {
                if i != j {
                    assert!(!a.contains(b), "keyword `{a}` contains `{b}`");
                }
            }
        }
    }

    #[test]
    fn test_keyword_order_does_not_change_results() {
        for (keyword, canonical) in PROGRAM_KEYWORDS {
            let reversed = PROGRAM_KEYWORDS
                .iter()
                .rev()
                .find(|(k, _)| keyword.contains(k))
                .map(|(_, c)| *c);
            assert_eq!(reversed, Some(*canonical));
            assert_eq!(norm(keyword), *canonical);
        }
    }

    #[test]
    fn test_is_unknown() {
        assert!(is_unknown(UNKNOWN_PROGRAM));
        assert!(!is_unknown("Economics"));
    }
}
