//! In-memory [`HttpClient`] used by unit tests.

use super::client::HttpClient;
use async_trait::async_trait;
use std::sync::Mutex;

struct Route {
    path: String,
    query_contains: Option<String>,
    status: u16,
    body: String,
    link: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<String>,
}

/// Answers requests from a fixed route table and records what it saw.
/// Unknown paths get a 404.
#[derive(Default)]
pub(crate) struct MockClient {
    routes: Vec<Route>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            path: path.to_string(),
            query_contains: None,
            status,
            body: body.to_string(),
            link: None,
        });
        self
    }

    /// Routes only requests whose query string contains `fragment`. Checked in
    /// insertion order, so register these before the catch-all for the path.
    pub fn route_query(
        mut self,
        path: &str,
        fragment: &str,
        status: u16,
        body: &str,
        link: Option<&str>,
    ) -> Self {
        self.routes.push(Route {
            path: path.to_string(),
            query_contains: Some(fragment.to_string()),
            status,
            body: body.to_string(),
            link: link.map(str::to_string),
        });
        self
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let path = req.url().path().to_string();
        let query = req.url().query().map(str::to_string);
        self.seen.lock().unwrap().push(SeenRequest {
            method: req.method().to_string(),
            path: path.clone(),
            query: query.clone(),
            authorization: req
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: req
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        });

        let route = self.routes.iter().find(|r| {
            r.path == path
                && r.query_contains.as_ref().is_none_or(|fragment| {
                    query.as_deref().is_some_and(|q| q.contains(fragment.as_str()))
                })
        });

        let mut builder = http::Response::builder();
        let body = match route {
            Some(route) => {
                builder = builder.status(route.status);
                if let Some(link) = &route.link {
                    builder = builder.header("link", link.as_str());
                }
                route.body.clone()
            }
            None => {
                builder = builder.status(404);
                format!("no route for {path}")
            }
        };
        Ok(reqwest::Response::from(builder.body(body).unwrap()))
    }
}
