//! Persistence abstraction for price records

use crate::core::error::Result;
use crate::core::price::PriceRecord;
use async_trait::async_trait;

/// Durable storage for raw price observations.
///
/// `save_all` is not idempotent: saving the same records twice stores them
/// twice.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self) -> Result<usize>;

    async fn find_all(&self) -> Result<Vec<PriceRecord>>;

    async fn find_by_currency_code(&self, currency_code: &str) -> Result<Vec<PriceRecord>>;

    async fn save_all(&self, records: &[PriceRecord]) -> Result<()>;
}
