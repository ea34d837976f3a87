use thiserror::Error;
use tracing::info;

use crate::controllers::{PageState, settle};
use crate::services::gradebook_api::{GradeUpdate, GradebookApi, SubmissionDetail};
use crate::session::SessionContext;

#[derive(Debug, Error, PartialEq)]
pub enum GradeInputError {
    #[error("Please enter a valid score")]
    NotANumber,
}

/// Parses the score field. Surrounding whitespace is ignored; anything that is
/// not a finite number is rejected.
pub fn parse_score(input: &str) -> Result<f64, GradeInputError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
        .ok_or(GradeInputError::NotANumber)
}

/// Builds the update to post: the parsed score plus the trimmed comment, if
/// any.
pub fn grade_update(score_input: &str, comment: &str) -> Result<GradeUpdate, GradeInputError> {
    let score = parse_score(score_input)?;
    let comment = comment.trim();
    Ok(GradeUpdate {
        score,
        comment: (!comment.is_empty()).then(|| comment.to_string()),
    })
}

pub struct GradingController<'a> {
    api: &'a dyn GradebookApi,
    session: &'a SessionContext,
    course_id: u64,
    assignment_id: u64,
    user_id: u64,
}

impl<'a> GradingController<'a> {
    pub fn new(
        api: &'a dyn GradebookApi,
        session: &'a SessionContext,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
    ) -> Self {
        Self {
            api,
            session,
            course_id,
            assignment_id,
            user_id,
        }
    }

    #[tracing::instrument(skip_all, fields(user_id = self.user_id))]
    pub async fn load(&self) -> PageState<SubmissionDetail> {
        if self.session.token().is_none() {
            return PageState::SignedOut;
        }
        let result = self
            .api
            .get_submission(self.course_id, self.assignment_id, self.user_id)
            .await;
        settle(self.session, "submission", result)
    }

    /// Validates and posts a grade. Invalid input fails without contacting the
    /// backend.
    #[tracing::instrument(skip_all, fields(user_id = self.user_id))]
    pub async fn submit(&self, score_input: &str, comment: &str) -> PageState<GradeUpdate> {
        if self.session.token().is_none() {
            return PageState::SignedOut;
        }
        let update = match grade_update(score_input, comment) {
            Ok(update) => update,
            Err(e) => return PageState::Failed(e.to_string()),
        };

        let result = self
            .api
            .update_grade(self.course_id, self.assignment_id, self.user_id, &update)
            .await;
        settle(self.session, "grade update", result).map(|_| {
            info!(score = update.score, commented = update.comment.is_some(), "Grade submitted");
            update
        })
    }
}
