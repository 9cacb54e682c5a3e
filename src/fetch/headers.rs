use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, InvalidHeaderValue, ORIGIN, REFERER,
    USER_AGENT,
};

use crate::config::RequestHeaders;
use crate::fetch::client::HttpClient;

/// An [`HttpClient`] wrapper that stamps the fixed browser-like header set
/// onto every request.
///
/// The bus API rejects requests that do not look like they come from its own
/// map frontend, so `Origin`, `Referer` and `User-Agent` act as an allow-list
/// token. Values are validated once, when the wrapper is built.
pub struct StaticHeaders<C> {
    inner: C,
    headers: HeaderMap,
}

impl<C> StaticHeaders<C> {
    pub fn new(inner: C, headers: &RequestHeaders) -> Result<Self, InvalidHeaderValue> {
        let mut map = HeaderMap::with_capacity(5);
        map.insert(ACCEPT, HeaderValue::from_str(&headers.accept)?);
        map.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&headers.accept_language)?);
        map.insert(ORIGIN, HeaderValue::from_str(&headers.origin)?);
        map.insert(REFERER, HeaderValue::from_str(&headers.referer)?);
        map.insert(USER_AGENT, HeaderValue::from_str(&headers.user_agent)?);
        Ok(Self {
            inner,
            headers: map,
        })
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for StaticHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::CannedClient;

    #[tokio::test]
    async fn test_injects_all_headers() {
        let fake = CannedClient::new().respond("/ping", 200, "{}");
        let client = StaticHeaders::new(fake, &RequestHeaders::default()).unwrap();

        let req = reqwest::Request::new(
            reqwest::Method::GET,
            "https://example.test/ping".parse().unwrap(),
        );
        let resp = client.execute(req).await.unwrap();
        assert_eq!(resp.status(), 200);

        let seen = client.inner().requests();
        assert_eq!(seen.len(), 1);
        let headers = &seen[0].headers;
        let defaults = RequestHeaders::default();
        assert_eq!(headers[ORIGIN], defaults.origin.as_str());
        assert_eq!(headers[REFERER], defaults.referer.as_str());
        assert_eq!(headers[USER_AGENT], defaults.user_agent.as_str());
        assert_eq!(headers[ACCEPT], defaults.accept.as_str());
        assert_eq!(headers[ACCEPT_LANGUAGE], defaults.accept_language.as_str());
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let headers = RequestHeaders {
            user_agent: "bad\nagent".to_string(),
            ..RequestHeaders::default()
        };
        assert!(StaticHeaders::new(CannedClient::new(), &headers).is_err());
    }
}
