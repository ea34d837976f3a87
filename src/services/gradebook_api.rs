//! Trait and types for the gradebook backends the dashboard talks to.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course the authenticated instructor can see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(default)]
    pub total_students: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub name: Option<String>,
}

impl Course {
    pub fn term_name(&self) -> Option<&str> {
        self.term
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// Code used in export metadata: the course code, else the course name.
    pub fn display_code(&self) -> Option<&str> {
        self.course_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(Some(self.name.as_str()).filter(|n| !n.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    #[serde(default)]
    pub needs_grading_count: Option<u32>,
}

impl Assignment {
    pub fn needs_grading(&self) -> bool {
        self.needs_grading_count.unwrap_or(0) > 0
    }
}

/// One student's submission as listed for an assignment.
///
/// `major` is never sent by the backends; it is filled in locally when a
/// roster is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub sis_user_id: Option<String>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStats {
    pub section: String,
    pub total_students: usize,
    pub graded: usize,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub total_students: usize,
    pub graded: usize,
    pub average_score: Option<f64>,
}

/// Grades-only analytics for one assignment, grouped by course section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentAnalytics {
    #[serde(default)]
    pub by_section: Vec<SectionStats>,
    #[serde(default)]
    pub class: ClassStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionComment {
    #[serde(default)]
    pub comment: String,
}

/// A single submission with its content, as shown on the grading page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetail {
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempt: Option<u32>,
    #[serde(default)]
    pub submission_type: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub submission_comments: Vec<SubmissionComment>,
}

/// A grade to post for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeUpdate {
    pub score: f64,
    pub comment: Option<String>,
}

/// Abstraction over the backends that serve course and grade data: the
/// dashboard's REST proxy or the Canvas API itself.
#[async_trait::async_trait]
pub trait GradebookApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;

    async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, ApiError>;

    async fn get_assignment(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Assignment, ApiError>;

    async fn list_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Vec<SubmissionRecord>, ApiError>;

    async fn get_assignment_analytics(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<AssignmentAnalytics, ApiError>;

    async fn get_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
    ) -> Result<SubmissionDetail, ApiError>;

    /// Posts a score and optional text comment. Returns the backend's echo of
    /// the updated submission.
    async fn update_grade(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
        update: &GradeUpdate,
    ) -> Result<serde_json::Value, ApiError>;
}
