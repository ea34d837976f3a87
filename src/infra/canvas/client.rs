use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use super::join::{RawEnrollment, RawSection, RawSubmission, join_submissions};
use crate::analytics::aggregate_by_section;
use crate::error::ApiError;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, fetch_json, next_page_url, read_json, request, send};
use crate::services::gradebook_api::{
    Assignment, AssignmentAnalytics, Course, GradeUpdate, GradebookApi, SubmissionDetail,
    SubmissionRecord,
};

pub const DEFAULT_CANVAS_BASE_URL: &str = "https://usflearn.instructure.com";

const PER_PAGE: &str = "100";

/// Talks to `{base}/api/v1` with a bearer token.
pub struct CanvasClient<C> {
    api_base: String,
    http: C,
}

impl CanvasClient<ApiKey<BasicClient>> {
    pub fn with_token(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = ApiKey::bearer(BasicClient::new(timeout)?, token)?;
        Ok(Self::new(base_url, http))
    }
}

impl<C: HttpClient> CanvasClient<C> {
    /// `base_url` is the Canvas host, e.g. `https://school.instructure.com`.
    pub fn new(base_url: &str, http: C) -> Self {
        Self {
            api_base: format!("{}/api/v1", base_url.trim_end_matches('/')),
            http,
        }
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Request, ApiError> {
        let mut req = request(method, &format!("{}{path}", self.api_base))?;
        if !query.is_empty() {
            let mut pairs = req.url_mut().query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(req)
    }

    /// Follows `rel="next"` links until the last page and concatenates the
    /// results.
    async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let mut req = self.build(Method::GET, path, query)?;
        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            let resp = send(&self.http, req).await?;
            let next = next_page_url(resp.headers());
            let page: Vec<T> = read_json(resp).await?;
            pages += 1;
            items.extend(page);

            match next {
                Some(url) => {
                    req = request(Method::GET, &url)?;
                    req.headers_mut()
                        .insert(ACCEPT, HeaderValue::from_static("application/json"));
                }
                None => break,
            }
        }

        debug!(path, pages, items = items.len(), "Fetched all pages");
        Ok(items)
    }

    async fn sections(&self, course_id: u64) -> Result<Vec<RawSection>, ApiError> {
        self.fetch_all_pages(
            &format!("/courses/{course_id}/sections"),
            &[("per_page", PER_PAGE)],
        )
        .await
    }

    async fn student_enrollments(&self, course_id: u64) -> Result<Vec<RawEnrollment>, ApiError> {
        self.fetch_all_pages(
            &format!("/courses/{course_id}/enrollments"),
            &[
                ("type[]", "StudentEnrollment"),
                ("include[]", "user"),
                ("per_page", PER_PAGE),
            ],
        )
        .await
    }

    async fn raw_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Vec<RawSubmission>, ApiError> {
        self.fetch_all_pages(
            &format!("/courses/{course_id}/assignments/{assignment_id}/submissions"),
            &[("include[]", "user"), ("per_page", PER_PAGE)],
        )
        .await
    }
}

#[async_trait]
impl<C: HttpClient> GradebookApi for CanvasClient<C> {
    #[instrument(skip(self))]
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.fetch_all_pages(
            "/courses",
            &[
                ("enrollment_state", "active"),
                ("state[]", "available"),
                ("state[]", "completed"),
                ("include[]", "term"),
                ("include[]", "total_students"),
                ("per_page", PER_PAGE),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, ApiError> {
        self.fetch_all_pages(
            &format!("/courses/{course_id}/assignments"),
            &[
                ("include[]", "submission"),
                ("order_by", "due_at"),
                ("per_page", PER_PAGE),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_assignment(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Assignment, ApiError> {
        let req = self.build(
            Method::GET,
            &format!("/courses/{course_id}/assignments/{assignment_id}"),
            &[],
        )?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self))]
    async fn list_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Vec<SubmissionRecord>, ApiError> {
        let (enrollments, sections, submissions) = tokio::try_join!(
            self.student_enrollments(course_id),
            self.sections(course_id),
            self.raw_submissions(course_id, assignment_id),
        )?;
        Ok(join_submissions(&submissions, &enrollments, &sections))
    }

    #[instrument(skip(self))]
    async fn get_assignment_analytics(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<AssignmentAnalytics, ApiError> {
        let records = self.list_submissions(course_id, assignment_id).await?;
        Ok(aggregate_by_section(&records))
    }

    #[instrument(skip(self))]
    async fn get_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
    ) -> Result<SubmissionDetail, ApiError> {
        let req = self.build(
            Method::GET,
            &format!("/courses/{course_id}/assignments/{assignment_id}/submissions/{user_id}"),
            &[("include[]", "submission_comments"), ("include[]", "user")],
        )?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self, update), fields(score = update.score))]
    async fn update_grade(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
        update: &GradeUpdate,
    ) -> Result<serde_json::Value, ApiError> {
        let mut payload = json!({ "submission": { "posted_grade": update.score } });
        if let Some(comment) = update.comment.as_deref().filter(|c| !c.is_empty()) {
            payload["comment"] = json!({ "text_comment": comment });
        }

        let mut req = self.build(
            Method::PUT,
            &format!("/courses/{course_id}/assignments/{assignment_id}/submissions/{user_id}"),
            &[],
        )?;
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(payload.to_string().into());

        fetch_json(&self.http, req).await
    }
}
