//! Canned-response [`HttpClient`] used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::client::HttpClient;

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub url: reqwest::Url,
    pub headers: HeaderMap,
}

/// Answers requests by matching `path?query` against registered responses.
/// Unknown routes get a 404.
#[derive(Default)]
pub struct CannedClient {
    routes: HashMap<String, (u16, String)>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl CannedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, route: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(route.to_string(), (status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for CannedClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().clone();
        let route = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        self.seen.lock().unwrap().push(SeenRequest {
            url,
            headers: req.headers().clone(),
        });

        let (status, body) = self
            .routes
            .get(&route)
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}
