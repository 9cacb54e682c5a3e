mod basic;
mod client;
#[cfg(test)]
pub(crate) mod fake;
mod headers;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use headers::StaticHeaders;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RequestError;

/// Longest slice of an error body kept in [`RequestError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// Performs a GET against `url` and decodes the JSON body into `T`.
///
/// Non-2xx statuses become [`RequestError::Status`] carrying the start of the
/// response body; anything `serde_json` cannot map onto `T` becomes
/// [`RequestError::Decode`].
pub async fn fetch_json<C, T>(client: &C, url: &str) -> Result<T, RequestError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let parsed = reqwest::Url::parse(url).map_err(|e| RequestError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;
    debug!(url, %status, bytes = bytes.len(), "Response received");

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes);
        let body = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(RequestError::Status { status, body });
    }

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::CannedClient;

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let client = CannedClient::new().respond("/list", 200, r#"[1, 2, 3]"#);
        let values: Vec<i64> = fetch_json(&client, "https://api.test/list").await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_json_maps_status() {
        let client = CannedClient::new().respond("/list", 503, "maintenance");
        let err = fetch_json::<_, Vec<i64>>(&client, "https://api.test/list")
            .await
            .unwrap_err();
        match err {
            RequestError::Status { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_json_truncates_long_error_body() {
        let long = "x".repeat(MAX_ERROR_BODY * 2);
        let client = CannedClient::new().respond("/list", 500, &long);
        let err = fetch_json::<_, Vec<i64>>(&client, "https://api.test/list")
            .await
            .unwrap_err();
        let RequestError::Status { body, .. } = err else {
            panic!("expected status error");
        };
        assert_eq!(body.len(), MAX_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_fetch_json_maps_malformed_body() {
        let client = CannedClient::new().respond("/list", 200, "<html>oops</html>");
        let err = fetch_json::<_, Vec<i64>>(&client, "https://api.test/list")
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_bad_url() {
        let client = CannedClient::new();
        let err = fetch_json::<_, Vec<i64>>(&client, "not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
        assert!(client.requests().is_empty());
    }
}
