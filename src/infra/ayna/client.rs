use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_json};
use crate::model::{EntityDetail, EntityStub};
use crate::services::bus_api::BusApi;

/// Client for the Ayna map API (`/getBusList`, `/getBusById`).
///
/// Owns its HTTP client, so session configuration (headers, timeouts) lives
/// here rather than in process-wide state.
pub struct AynaClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> AynaClient<C> {
    pub fn new(base_url: impl Into<String>, http: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self) -> String {
        format!("{}/getBusList", self.base_url)
    }

    fn detail_url(&self, id: i64) -> String {
        format!("{}/getBusById?id={}", self.base_url, id)
    }
}

#[async_trait]
impl<C: HttpClient> BusApi for AynaClient<C> {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_entities(&self) -> Result<Vec<EntityStub>, FetchError> {
        let stubs: Vec<EntityStub> = fetch_json(&self.http, &self.list_url())
            .await
            .map_err(FetchError::List)?;
        info!(count = stubs.len(), "Bus list fetched");
        Ok(stubs)
    }

    #[tracing::instrument(skip(self))]
    async fn get_detail(&self, id: i64) -> Result<EntityDetail, FetchError> {
        let detail: EntityDetail = fetch_json(&self.http, &self.detail_url(id))
            .await
            .map_err(|source| FetchError::Detail { id, source })?;
        debug!(fields = detail.fields().len(), "Bus detail fetched");
        Ok(detail)
    }
}
