use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Auth wrappers and test doubles implement this
/// so the API clients never talk to `reqwest::Client` directly.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for &T {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
