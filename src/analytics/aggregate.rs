use crate::analytics::types::{DEFAULT_POINTS_POSSIBLE, ProgramGroup};
use crate::analytics::utility::average;
use crate::program::{is_unknown, normalize_program};
use crate::services::gradebook_api::{
    AssignmentAnalytics, ClassStats, SectionStats, SubmissionRecord,
};
use std::collections::BTreeMap;

/// Section label for submissions whose enrollment has no known section.
pub const UNKNOWN_SECTION: &str = "Unknown Section";

/// Pass thresholds as fractions of possible points.
const THRESHOLD_70: f64 = 0.7;
const THRESHOLD_80: f64 = 0.8;

/// Maximum score used for pass thresholds: the assignment's points, or
/// [`DEFAULT_POINTS_POSSIBLE`] when absent or not positive.
pub fn effective_points(points_possible: Option<f64>) -> f64 {
    points_possible
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(DEFAULT_POINTS_POSSIBLE)
}

/// Groups submissions by normalized program.
///
/// Submissions that normalize to the unknown-program placeholder are dropped.
/// Groups come back sorted by program name.
pub fn aggregate_by_program(
    submissions: &[SubmissionRecord],
    points_possible: Option<f64>,
) -> Vec<ProgramGroup> {
    let points = effective_points(points_possible);
    let threshold_70 = points * THRESHOLD_70;
    let threshold_80 = points * THRESHOLD_80;

    let mut groups: BTreeMap<String, ProgramGroup> = BTreeMap::new();

    for s in submissions {
        let program = normalize_program(s.major.as_deref());
        if is_unknown(&program) {
            continue;
        }

        let group = groups
            .entry(program)
            .or_insert_with_key(|p| ProgramGroup::new(p.clone()));
        group.students += 1;

        if let Some(score) = s.score {
            group.graded += 1;
            group.score_sum += score;
            if score >= threshold_70 {
                group.at_or_above_70 += 1;
            }
            if score >= threshold_80 {
                group.at_or_above_80 += 1;
            }
        }
    }

    groups.into_values().collect()
}

/// Grades-only analytics grouped by section name, plus class-wide totals.
/// Sections come back sorted by name.
pub fn aggregate_by_section(submissions: &[SubmissionRecord]) -> AssignmentAnalytics {
    #[derive(Default)]
    struct Bucket {
        count: usize,
        graded: usize,
        sum: f64,
    }

    let mut buckets: BTreeMap<&str, Bucket> = BTreeMap::new();
    let mut class = Bucket::default();

    for s in submissions {
        let section = s
            .section_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_SECTION);
        let bucket = buckets.entry(section).or_default();
        bucket.count += 1;
        class.count += 1;

        if let Some(score) = s.score {
            bucket.graded += 1;
            bucket.sum += score;
            class.graded += 1;
            class.sum += score;
        }
    }

    AssignmentAnalytics {
        by_section: buckets
            .into_iter()
            .map(|(section, b)| SectionStats {
                section: section.to_string(),
                total_students: b.count,
                graded: b.graded,
                average_score: average(b.sum, b.graded),
            })
            .collect(),
        class: ClassStats {
            total_students: class.count,
            graded: class.graded,
            average_score: average(class.sum, class.graded),
        },
    }
}
