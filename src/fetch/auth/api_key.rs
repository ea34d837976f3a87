use crate::error::ApiError;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects a credential as an HTTP header.
///
/// Used for direct Canvas access, where the API token travels as
/// `Authorization: Bearer <token>`.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Wraps `inner` with an arbitrary header. Fails if either the name or the
    /// value is not a legal header token.
    pub fn new(inner: C, header_name: &str, value: &str) -> Result<Self, ApiError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
        let mut value =
            HeaderValue::from_str(value).map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Convenience constructor for `Authorization: Bearer <token>`.
    pub fn bearer(inner: C, token: &str) -> Result<Self, ApiError> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {token}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
