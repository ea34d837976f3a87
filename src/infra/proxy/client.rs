use async_trait::async_trait;
use reqwest::{Method, Request};
use std::time::Duration;
use tracing::instrument;

use crate::error::ApiError;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient, fetch_json, request};
use crate::services::gradebook_api::{
    Assignment, AssignmentAnalytics, Course, GradeUpdate, GradebookApi, SubmissionDetail,
    SubmissionRecord,
};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:8765/api";

/// Client for the dashboard's REST proxy (`/api/...`), which forwards to
/// Canvas. The Canvas token rides on every request as `?token=`.
pub struct ProxyClient<C> {
    base_url: String,
    http: C,
}

impl ProxyClient<UrlParam<BasicClient>> {
    pub fn with_token(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = UrlParam::token(BasicClient::new(timeout)?, token);
        Ok(Self::new(base_url, http))
    }
}

impl<C: HttpClient> ProxyClient<C> {
    /// `base_url` is the proxy's API root, e.g. `http://localhost:8765/api`.
    pub fn new(base_url: &str, http: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Request, ApiError> {
        let mut req = request(method, &format!("{}{path}", self.base_url))?;
        if !query.is_empty() {
            let mut pairs = req.url_mut().query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(req)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Request, ApiError> {
        self.build(Method::GET, path, query)
    }
}

fn ids(course_id: u64, assignment_id: u64) -> [(&'static str, String); 2] {
    [
        ("course_id", course_id.to_string()),
        ("assignment_id", assignment_id.to_string()),
    ]
}

#[async_trait]
impl<C: HttpClient> GradebookApi for ProxyClient<C> {
    #[instrument(skip(self))]
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let req = self.get("/courses", &[])?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self))]
    async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, ApiError> {
        let req = self.get("/assignments", &[("course_id", course_id.to_string())])?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self))]
    async fn get_assignment(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Assignment, ApiError> {
        let req = self.get("/assignment", &ids(course_id, assignment_id))?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self))]
    async fn list_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Vec<SubmissionRecord>, ApiError> {
        let req = self.get("/submissions", &ids(course_id, assignment_id))?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self))]
    async fn get_assignment_analytics(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<AssignmentAnalytics, ApiError> {
        let req = self.get("/analytics/assignment", &ids(course_id, assignment_id))?;
        fetch_json(&self.http, req).await
    }

    #[instrument(skip(self))]
    async fn get_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
    ) -> Result<SubmissionDetail, ApiError> {
        let req = self.get(
            &format!("/submission/{user_id}"),
            &ids(course_id, assignment_id),
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
        let [course, assignment] = ids(course_id, assignment_id);
        let mut query = vec![
            course,
            assignment,
            ("user_id", user_id.to_string()),
            ("score", update.score.to_string()),
        ];
        if let Some(comment) = update.comment.as_deref().filter(|c| !c.is_empty()) {
            query.push(("comment", comment.to_string()));
        }
        let req = self.build(Method::PUT, "/grade", &query)?;
        fetch_json(&self.http, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MockClient;

    fn client(mock: &MockClient) -> ProxyClient<UrlParam<&MockClient>> {
        ProxyClient::new("http://proxy.test/api/", UrlParam::token(mock, "tok"))
    }

    #[tokio::test]
    async fn test_list_courses_passes_token() {
        let mock = MockClient::new().route(
            "/api/courses",
            200,
            r#"[{"id":1,"name":"Algorithms","course_code":"COT4400","term":{"name":"Fall 2024"}}]"#,
        );

        let courses = client(&mock).list_courses().await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].term_name(), Some("Fall 2024"));

        let seen = mock.requests();
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].query.as_deref(), Some("token=tok"));
    }

    #[tokio::test]
    async fn test_submission_endpoints_carry_ids() {
        let mock = MockClient::new()
            .route("/api/submissions", 200, r#"[{"user_id":4,"user_name":"Ada","score":88}]"#)
            .route("/api/submission/4", 200, r#"{"user":{"name":"Ada"},"score":88}"#);
        let api = client(&mock);

        let subs = api.list_submissions(10, 20).await.unwrap();
        assert_eq!(subs[0].score, Some(88.0));

        let detail = api.get_submission(10, 20, 4).await.unwrap();
        assert_eq!(detail.user.and_then(|u| u.name).as_deref(), Some("Ada"));

        let seen = mock.requests();
        assert_eq!(seen[0].query.as_deref(), Some("course_id=10&assignment_id=20&token=tok"));
        assert_eq!(seen[1].path, "/api/submission/4");
    }

    #[tokio::test]
    async fn test_update_grade_uses_put_with_optional_comment() {
        let mock = MockClient::new().route("/api/grade", 200, r#"{"id":99}"#);
        let api = client(&mock);

        let update = GradeUpdate {
            score: 92.5,
            comment: Some("Good job".into()),
        };
        api.update_grade(1, 2, 3, &update).await.unwrap();

        let update = GradeUpdate {
            score: 80.0,
            comment: None,
        };
        api.update_grade(1, 2, 3, &update).await.unwrap();

        let seen = mock.requests();
        assert_eq!(seen[0].method, "PUT");
        assert_eq!(
            seen[0].query.as_deref(),
            Some("course_id=1&assignment_id=2&user_id=3&score=92.5&comment=Good+job&token=tok")
        );
        assert_eq!(
            seen[1].query.as_deref(),
            Some("course_id=1&assignment_id=2&user_id=3&score=80&token=tok")
        );
    }

    #[tokio::test]
    async fn test_rejected_token_surfaces_as_auth_failure() {
        let mock = MockClient::new().route("/api/courses", 401, "invalid token");
        let err = client(&mock).list_courses().await.unwrap_err();
        assert!(err.is_auth_failure());
    }
}
