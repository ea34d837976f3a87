use tracing::info;

use crate::controllers::{PageState, settle};
use crate::services::gradebook_api::{Course, GradebookApi};
use crate::session::SessionContext;

pub const NO_COURSES: &str =
    "No courses found. Make sure you are enrolled in at least one course.";

pub struct CoursesController<'a> {
    api: &'a dyn GradebookApi,
    session: &'a SessionContext,
}

impl<'a> CoursesController<'a> {
    pub fn new(api: &'a dyn GradebookApi, session: &'a SessionContext) -> Self {
        Self { api, session }
    }

    /// Loads the instructor's courses. Without a token this is a quiet
    /// [`PageState::SignedOut`], not an error.
    #[tracing::instrument(skip_all)]
    pub async fn load(&self) -> PageState<Vec<Course>> {
        if self.session.token().is_none() {
            info!("No token stored, waiting for sign-in");
            return PageState::SignedOut;
        }

        match settle(self.session, "courses", self.api.list_courses().await) {
            PageState::Ready(courses) if courses.is_empty() => {
                PageState::Failed(NO_COURSES.to_string())
            }
            PageState::Ready(courses) => {
                info!(count = courses.len(), "Courses loaded");
                PageState::Ready(courses)
            }
            other => other,
        }
    }
}
