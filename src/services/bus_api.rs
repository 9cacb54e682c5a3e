//! Trait for the two-stage bus API: list everything, then fetch one by id.

use crate::error::FetchError;
use crate::model::{EntityDetail, EntityStub};

/// Abstraction over a bus data provider (e.g., Ayna).
#[async_trait::async_trait]
pub trait BusApi: Send + Sync {
    /// Returns every bus the provider knows about, in provider order.
    ///
    /// A failure here is fatal for a scrape run.
    async fn list_entities(&self) -> Result<Vec<EntityStub>, FetchError>;

    /// Returns the full record for one bus.
    ///
    /// Errors carry `id` so the caller can report and skip it. No retries.
    async fn get_detail(&self, id: i64) -> Result<EntityDetail, FetchError>;
}
