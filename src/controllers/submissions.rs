use anyhow::{Result, bail};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::analytics::{ProgramGroup, aggregate_by_program, effective_points};
use crate::controllers::{PageState, settle};
use crate::export::{
    ExportKind, ExportMetadata, program_analytics_csv, submissions_csv,
};
use crate::services::gradebook_api::{
    Assignment, AssignmentAnalytics, Course, GradebookApi, SubmissionRecord,
};
use crate::session::SessionContext;

/// A rendered CSV export and the filename it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

/// Everything the submissions page shows for one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionsPage {
    pub course_id: u64,
    pub assignment: Assignment,
    pub analytics: AssignmentAnalytics,
    /// Majors are filled in when a roster was stored for the course.
    pub submissions: Vec<SubmissionRecord>,
    /// Best-effort; used for the export course code.
    pub course: Option<Course>,
    pub roster_loaded: bool,
}

impl SubmissionsPage {
    /// Program groups for the analytics table. Empty until a roster is loaded.
    pub fn program_groups(&self) -> Vec<ProgramGroup> {
        if !self.roster_loaded {
            return Vec::new();
        }
        aggregate_by_program(&self.submissions, self.assignment.points_possible)
    }

    pub fn export_metadata(&self, today: NaiveDate, kind: ExportKind) -> ExportMetadata {
        let total_points = match kind {
            ExportKind::ProgramAnalytics => Some(effective_points(self.assignment.points_possible)),
            ExportKind::Submissions | ExportKind::SubmissionsNoNames => None,
        };
        ExportMetadata::for_date(
            today,
            self.course.as_ref().and_then(Course::display_code),
            Some(self.assignment.name.as_str()),
            total_points,
        )
    }

    /// Renders the export of the given kind, dated `today`.
    pub fn export(&self, today: NaiveDate, kind: ExportKind) -> Result<CsvExport> {
        let meta = self.export_metadata(today, kind);
        let contents = match kind {
            ExportKind::ProgramAnalytics => {
                if !self.roster_loaded {
                    bail!(
                        "no roster imported for course {}; program analytics need one",
                        self.course_id
                    );
                }
                program_analytics_csv(&meta, &self.program_groups())?
            }
            ExportKind::Submissions => submissions_csv(&meta, &self.submissions, true)?,
            ExportKind::SubmissionsNoNames => submissions_csv(&meta, &self.submissions, false)?,
        };
        Ok(CsvExport {
            filename: meta.filename(kind),
            contents,
        })
    }
}

pub struct SubmissionsController<'a> {
    api: &'a dyn GradebookApi,
    session: &'a SessionContext,
    course_id: u64,
    assignment_id: u64,
}

impl<'a> SubmissionsController<'a> {
    pub fn new(
        api: &'a dyn GradebookApi,
        session: &'a SessionContext,
        course_id: u64,
        assignment_id: u64,
    ) -> Self {
        Self {
            api,
            session,
            course_id,
            assignment_id,
        }
    }

    /// Fetches assignment detail, section analytics and submissions together;
    /// all three are required. The course list is fetched alongside as a
    /// best-effort lookup of the course code.
    #[tracing::instrument(
        skip_all,
        fields(course_id = self.course_id, assignment_id = self.assignment_id)
    )]
    pub async fn load(&self) -> PageState<SubmissionsPage> {
        if self.session.token().is_none() {
            return PageState::SignedOut;
        }

        let (course_id, assignment_id) = (self.course_id, self.assignment_id);
        let required = async {
            tokio::try_join!(
                self.api.get_assignment(course_id, assignment_id),
                self.api.get_assignment_analytics(course_id, assignment_id),
                self.api.list_submissions(course_id, assignment_id),
            )
        };
        let (required, courses) = tokio::join!(required, self.api.list_courses());

        let course = match courses {
            Ok(courses) => courses.into_iter().find(|c| c.id == course_id),
            Err(e) => {
                warn!(error = %e, "Course info unavailable, exports fall back to a generic code");
                None
            }
        };

        let roster = self.session.roster(course_id);
        settle(self.session, "submissions", required).map(
            |(assignment, analytics, mut submissions)| {
                if let Some(roster) = &roster {
                    roster.apply(&mut submissions);
                }
                info!(
                    submissions = submissions.len(),
                    roster_loaded = roster.is_some(),
                    "Submissions loaded"
                );
                SubmissionsPage {
                    course_id,
                    assignment,
                    analytics,
                    submissions,
                    course,
                    roster_loaded: roster.is_some(),
                }
            },
        )
    }
}
