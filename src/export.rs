//! CSV export of program analytics and submission tables.
//!
//! Every export starts with a metadata block (`Year:`, `Semester:`, `Course:`,
//! `Assignment:`, optionally `Assignment Total Points:`), one blank line, then
//! a header row and the data rows. Spreadsheet templates downstream rely on
//! that layout and on the column order.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use csv::{QuoteStyle, WriterBuilder};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analytics::{ProgramGroup, SubmissionStatus};
use crate::program::normalize_program;
use crate::services::gradebook_api::SubmissionRecord;

pub const ANALYTICS_HEADER: &str = "Program,Students,Graded,Average Score,70%,80%";
pub const SUBMISSIONS_HEADER: &str = "Student,Program,Status,Score";
pub const SUBMISSIONS_NO_NAMES_HEADER: &str = "Student No,Program,Status,Score";

/// Shown in the average column when a program has no graded submissions.
pub const NO_AVERAGE: &str = "—";

const FALLBACK_COURSE: &str = "Course";
const FALLBACK_ASSIGNMENT: &str = "Assignment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    Spring,
    Summer,
    Fall,
}

impl Semester {
    /// Months 1–5 are Spring, 6–7 Summer, everything else Fall.
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=5 => Semester::Spring,
            6..=7 => Semester::Summer,
            _ => Semester::Fall,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Semester::Spring => "Spring",
            Semester::Summer => "Summer",
            Semester::Fall => "Fall",
        })
    }
}

/// Which table is being exported; decides the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    ProgramAnalytics,
    Submissions,
    SubmissionsNoNames,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub year: i32,
    pub semester: Semester,
    pub course_code: String,
    pub assignment_name: String,
    pub total_points: Option<f64>,
}

impl ExportMetadata {
    /// Metadata dated `date`, with the course and assignment fallbacks applied
    /// to missing or blank names.
    pub fn for_date(
        date: NaiveDate,
        course_code: Option<&str>,
        assignment_name: Option<&str>,
        total_points: Option<f64>,
    ) -> Self {
        let non_blank = |s: Option<&str>, fallback: &str| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            year: date.year(),
            semester: Semester::from_month(date.month()),
            course_code: non_blank(course_code, FALLBACK_COURSE),
            assignment_name: non_blank(assignment_name, FALLBACK_ASSIGNMENT),
            total_points,
        }
    }

    /// `{year}-{semester}-{course}-{assignment}[-Submissions][-NoNames].csv`
    ///
    /// Course code and assignment name are both sanitized, so the result is a
    /// single path component.
    pub fn filename(&self, kind: ExportKind) -> String {
        let suffix = match kind {
            ExportKind::ProgramAnalytics => "",
            ExportKind::Submissions => "-Submissions",
            ExportKind::SubmissionsNoNames => "-Submissions-NoNames",
        };
        format!(
            "{}-{}-{}-{}{}.csv",
            self.year,
            self.semester,
            sanitize_name(&self.course_code),
            sanitize_name(&self.assignment_name),
            suffix
        )
    }

    fn write_header(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        writeln!(out, "Year: {}", self.year)?;
        writeln!(out, "Semester: {}", self.semester)?;
        writeln!(out, "Course: {}", self.course_code)?;
        writeln!(out, "Assignment: {}", self.assignment_name)?;
        if let Some(points) = self.total_points {
            writeln!(out, "Assignment Total Points: {}", format_number(points))?;
        }
        writeln!(out)
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_` and collapses runs
/// of `_` into one.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Formats a number the way the dashboard always has: integers without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// `{:.2}` average, or [`NO_AVERAGE`].
pub fn format_average(average: Option<f64>) -> String {
    average.map_or_else(|| NO_AVERAGE.to_string(), |a| format!("{a:.2}"))
}

/// Whole-number percentage, rounded half away from zero.
pub fn format_percent(percent: f64) -> String {
    format!("{}%", percent.round() as i64)
}

/// Renders the per-program analytics table.
///
/// The metadata always carries total points here; `points_possible` falls back
/// to the default when the assignment does not report one.
pub fn program_analytics_csv(meta: &ExportMetadata, groups: &[ProgramGroup]) -> Result<String> {
    let mut out = Vec::new();
    meta.write_header(&mut out)?;
    writeln!(out, "{ANALYTICS_HEADER}")?;

    {
        let mut writer = row_writer(&mut out, QuoteStyle::Necessary);
        for g in groups {
            writer.write_record([
                g.program.clone(),
                g.students.to_string(),
                g.graded.to_string(),
                format_average(g.average()),
                format_percent(g.pass_rate_70()),
                format_percent(g.pass_rate_80()),
            ])?;
        }
        writer.flush()?;
    }

    debug!(rows = groups.len(), "Program analytics CSV rendered");
    Ok(String::from_utf8(out)?)
}

/// Renders the raw submissions table.
///
/// With names, every data field is quoted so student names survive commas.
/// Without names, rows are numbered from 1 in input order.
pub fn submissions_csv(
    meta: &ExportMetadata,
    submissions: &[SubmissionRecord],
    with_names: bool,
) -> Result<String> {
    let mut out = Vec::new();
    meta.write_header(&mut out)?;

    let (header, quoting) = if with_names {
        (SUBMISSIONS_HEADER, QuoteStyle::Always)
    } else {
        (SUBMISSIONS_NO_NAMES_HEADER, QuoteStyle::Necessary)
    };
    writeln!(out, "{header}")?;

    {
        let mut writer = row_writer(&mut out, quoting);
        for (index, s) in submissions.iter().enumerate() {
            let first = if with_names {
                s.user_name.clone().unwrap_or_else(|| "Unknown".to_string())
            } else {
                (index + 1).to_string()
            };
            writer.write_record([
                first,
                normalize_program(s.major.as_deref()),
                SubmissionStatus::of(s).to_string(),
                s.score.map(format_number).unwrap_or_default(),
            ])?;
        }
        writer.flush()?;
    }

    debug!(rows = submissions.len(), with_names, "Submissions CSV rendered");
    Ok(String::from_utf8(out)?)
}

/// Writes an export into `dir`, creating it if needed, and returns the path.
pub fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "CSV export written");
    Ok(path)
}

fn row_writer<W: Write>(out: W, quoting: QuoteStyle) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(quoting)
        .from_writer(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn meta(points: Option<f64>) -> ExportMetadata {
        ExportMetadata {
            year: 2024,
            semester: Semester::Fall,
            course_code: "COP3502".into(),
            assignment_name: "HW1".into(),
            total_points: points,
        }
    }

    fn record(name: &str, major: &str, score: Option<f64>, workflow: &str) -> SubmissionRecord {
        SubmissionRecord {
            user_id: Some(1),
            user_name: Some(name.into()),
            login_id: None,
            sis_user_id: None,
            section_name: None,
            submitted: workflow != "unsubmitted",
            missing: false,
            workflow_state: Some(workflow.into()),
            score,
            major: Some(major.into()),
        }
    }

    #[test]
    fn test_semester_from_month() {
        let expected = [
            (1, Semester::Spring),
            (5, Semester::Spring),
            (6, Semester::Summer),
            (7, Semester::Summer),
            (8, Semester::Fall),
            (12, Semester::Fall),
        ];
        for (month, semester) in expected {
            assert_eq!(Semester::from_month(month), semester, "month {month}");
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("HW #1: Intro!"), "HW_1_Intro_");
        assert_eq!(sanitize_name("Lab 3"), "Lab_3");
        assert_eq!(sanitize_name("__a__b__"), "_a_b_");
        assert_eq!(sanitize_name("Ünïcode"), "_n_code");
    }

    #[test]
    fn test_filenames() {
        let m = meta(Some(100.0));
        assert_eq!(m.filename(ExportKind::ProgramAnalytics), "2024-Fall-COP3502-HW1.csv");
        assert_eq!(m.filename(ExportKind::Submissions), "2024-Fall-COP3502-HW1-Submissions.csv");
        assert_eq!(
            m.filename(ExportKind::SubmissionsNoNames),
            "2024-Fall-COP3502-HW1-Submissions-NoNames.csv"
        );
    }

    #[test]
    fn test_filename_is_a_single_path_component() {
        let mut m = meta(Some(100.0));
        m.course_code = "COP3502/COP3503".into();
        assert_eq!(
            m.filename(ExportKind::ProgramAnalytics),
            "2024-Fall-COP3502_COP3503-HW1.csv"
        );

        m.course_code = "../x".into();
        assert_eq!(m.filename(ExportKind::Submissions), "2024-Fall-_x-HW1-Submissions.csv");
    }

    #[test]
    fn test_cross_listed_course_export_stays_in_directory() {
        let dir = env::temp_dir().join(format!(
            "gradebook_analytics_cross_listed_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);

        let mut m = meta(Some(100.0));
        m.course_code = "COP3502/COP3503".into();
        let csv = program_analytics_csv(&m, &[]).unwrap();
        let path = write_export(&dir, &m.filename(ExportKind::ProgramAnalytics), &csv).unwrap();

        assert_eq!(path.parent(), Some(dir.as_path()));
        assert!(fs::read_to_string(&path).unwrap().contains("Course: COP3502/COP3503\n"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_for_date_applies_fallbacks() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let m = ExportMetadata::for_date(date, None, Some("  "), None);
        assert_eq!(m.year, 2025);
        assert_eq!(m.semester, Semester::Summer);
        assert_eq!(m.course_code, "Course");
        assert_eq!(m.assignment_name, "Assignment");
    }

    #[test]
    fn test_program_analytics_csv_layout() {
        let groups = vec![ProgramGroup {
            program: "Computer Science".into(),
            students: 10,
            graded: 8,
            score_sum: 680.0,
            at_or_above_70: 6,
            at_or_above_80: 5,
        }];

        let csv = program_analytics_csv(&meta(Some(100.0)), &groups).unwrap();
        assert_eq!(
            csv,
            "Year: 2024\n\
             Semester: Fall\n\
             Course: COP3502\n\
             Assignment: HW1\n\
             Assignment Total Points: 100\n\
             \n\
             Program,Students,Graded,Average Score,70%,80%\n\
             Computer Science,10,8,85.00,75%,63%\n"
        );
    }

    #[test]
    fn test_program_analytics_csv_ungraded_group() {
        let groups = vec![ProgramGroup::new("Economics, Applied")];
        let csv = program_analytics_csv(&meta(Some(100.0)), &groups).unwrap();
        assert!(csv.ends_with("\"Economics, Applied\",0,0,—,0%,0%\n"));
    }

    #[test]
    fn test_submissions_csv_with_names() {
        let subs = vec![
            record("Lovelace, Ada", "[4R]Computer Science", Some(92.5), "graded"),
            record("Alan Turing", "Unknown Program", None, "submitted"),
        ];
        let csv = submissions_csv(&meta(None), &subs, true).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[3], "Assignment: HW1");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], SUBMISSIONS_HEADER);
        assert_eq!(lines[6], r#""Lovelace, Ada","Computer Science","Graded","92.5""#);
        assert_eq!(lines[7], r#""Alan Turing","Unknown Program","Submitted","""#);
        assert!(!csv.contains("Assignment Total Points"));
    }

    #[test]
    fn test_submissions_csv_without_names() {
        let subs = vec![
            record("Ada", "Economics", Some(70.0), "graded"),
            record("Alan", "Cybersecurity", None, "unsubmitted"),
        ];
        let csv = submissions_csv(&meta(None), &subs, false).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[5], SUBMISSIONS_NO_NAMES_HEADER);
        assert_eq!(lines[6], "1,Economics,Graded,70");
        assert_eq!(lines[7], "2,Cybersecurity,Pending,");
        assert!(!csv.contains("Ada"));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_average(None), "—");
        assert_eq!(format_average(Some(84.996)), "85.00");
        assert_eq!(format_percent(62.5), "63%");
        assert_eq!(format_percent(12.5), "13%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = env::temp_dir().join(format!(
            "gradebook_analytics_export_test_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);

        let path = write_export(&dir, "out.csv", "Year: 2024\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Year: 2024\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
