use tracing::{info, warn};

use crate::controllers::{PageState, settle};
use crate::services::gradebook_api::{Assignment, Course, GradebookApi};
use crate::session::SessionContext;

/// Assignments of one course, split into the two dashboard tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentsPage {
    pub course_id: u64,
    /// `name • term`, when the course list could be fetched.
    pub course_title: Option<String>,
    pub needs_grading: Vec<Assignment>,
    pub graded: Vec<Assignment>,
}

impl AssignmentsPage {
    pub fn new(course_id: u64, course_title: Option<String>, assignments: Vec<Assignment>) -> Self {
        let (needs_grading, graded): (Vec<_>, Vec<_>) = assignments
            .into_iter()
            .partition(Assignment::needs_grading);
        Self {
            course_id,
            course_title,
            needs_grading,
            graded,
        }
    }
}

/// `name • term`, or just the name when the term is unknown.
pub fn course_title(course: &Course) -> String {
    match course.term_name() {
        Some(term) => format!("{} • {}", course.name, term),
        None => course.name.clone(),
    }
}

pub struct AssignmentsController<'a> {
    api: &'a dyn GradebookApi,
    session: &'a SessionContext,
    course_id: u64,
}

impl<'a> AssignmentsController<'a> {
    pub fn new(api: &'a dyn GradebookApi, session: &'a SessionContext, course_id: u64) -> Self {
        Self {
            api,
            session,
            course_id,
        }
    }

    /// Loads the assignment list. The course list is fetched alongside it only
    /// to label the page; if that fails the page still loads untitled.
    #[tracing::instrument(skip_all, fields(course_id = self.course_id))]
    pub async fn load(&self) -> PageState<AssignmentsPage> {
        if self.session.token().is_none() {
            return PageState::SignedOut;
        }

        let (assignments, courses) = tokio::join!(
            self.api.list_assignments(self.course_id),
            self.api.list_courses()
        );

        let title = match courses {
            Ok(courses) => courses
                .iter()
                .find(|c| c.id == self.course_id)
                .map(course_title),
            Err(e) => {
                warn!(error = %e, "Course info unavailable, continuing without title");
                None
            }
        };

        settle(self.session, "assignments", assignments).map(|assignments| {
            let page = AssignmentsPage::new(self.course_id, title, assignments);
            info!(
                needs_grading = page.needs_grading.len(),
                graded = page.graded.len(),
                "Assignments loaded"
            );
            page
        })
    }
}
