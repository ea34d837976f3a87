mod basic;
mod client;
pub mod auth;
#[cfg(test)]
pub(crate) mod testing;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::ApiError;
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Builds a bare request for `url`.
pub fn request(method: Method, url: &str) -> Result<Request, ApiError> {
    let url = reqwest::Url::parse(url).map_err(|e| ApiError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Request::new(method, url))
}

/// Executes `req` and classifies the response status.
///
/// 401 and 403 become [`ApiError::Unauthorized`]; any other non-2xx status
/// becomes [`ApiError::Status`] carrying the response body.
pub async fn send<C: HttpClient + ?Sized>(client: &C, req: Request) -> Result<Response, ApiError> {
    let method = req.method().clone();
    let path = req.url().path().to_string();

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(%method, path, status = status.as_u16(), "HTTP response");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Reads a successful response body as JSON.
pub async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Executes `req` and decodes the JSON body.
pub async fn fetch_json<C: HttpClient + ?Sized, T: DeserializeOwned>(
    client: &C,
    req: Request,
) -> Result<T, ApiError> {
    let resp = send(client, req).await?;
    read_json(resp).await
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header, the way
/// Canvas advertises its pagination.
pub fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MockClient;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    #[test]
    fn test_next_page_url_picks_next_relation() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://c.test/api/v1/courses?page=1>; rel=\"current\",\
                 <https://c.test/api/v1/courses?page=2>; rel=\"next\",\
                 <https://c.test/api/v1/courses?page=9>; rel=\"last\"",
            ),
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://c.test/api/v1/courses?page=2")
        );
    }

    #[test]
    fn test_next_page_url_absent_on_last_page() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static("<https://c.test/x?page=3>; rel=\"last\""),
        );
        assert_eq!(next_page_url(&headers), None);
        assert_eq!(next_page_url(&HeaderMap::new()), None);
    }

    #[test]
    fn test_request_rejects_invalid_url() {
        let result = request(Method::GET, "not a url");
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let mock = MockClient::new().route("/items", 200, r#"[{"id":1},{"id":2}]"#);
        let req = request(Method::GET, "http://proxy.test/items").unwrap();
        let items: Vec<Item> = fetch_json(&mock, req).await.unwrap();
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    }

    #[tokio::test]
    async fn test_send_classifies_auth_failures() {
        let mock = MockClient::new()
            .route("/denied", 403, "forbidden")
            .route("/broken", 500, "boom");

        let req = request(Method::GET, "http://proxy.test/denied").unwrap();
        let err = send(&mock, req).await.unwrap_err();
        assert!(err.is_auth_failure());

        let req = request(Method::GET, "http://proxy.test/broken").unwrap();
        match send(&mock, req).await.unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_json_reports_malformed_body() {
        let mock = MockClient::new().route("/items", 200, "{not json");
        let req = request(Method::GET, "http://proxy.test/items").unwrap();
        let result: Result<Vec<Item>, _> = fetch_json(&mock, req).await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
