use crate::core::error::Result;
use crate::core::price::PriceRecord;
use crate::core::store::RecordStore;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory record store, used for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<PriceRecord>>,
}

impl MemoryRecordStore {
    /// Creates a new empty MemoryRecordStore
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn count(&self) -> Result<usize> {
        Ok(self.records.lock().await.len())
    }

    async fn find_all(&self) -> Result<Vec<PriceRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn find_by_currency_code(&self, currency_code: &str) -> Result<Vec<PriceRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.currency_code == currency_code)
            .cloned()
            .collect())
    }

    async fn save_all(&self, records: &[PriceRecord]) -> Result<()> {
        let mut stored = self.records.lock().await;
        debug!("Store SAVE {} records", records.len());
        stored.extend_from_slice(records);
        Ok(())
    }
}
