use crate::core::error::{Result, StatsError};
use crate::core::price::PriceRecord;
use crate::core::store::RecordStore;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const RECORDS_PARTITION: &str = "records";

/// Record store persisted in a fjall keyspace.
///
/// Keys are `<CODE> 0x00 <sequence as big-endian u64>` so that a prefix scan
/// returns one currency's records. Values are JSON-encoded [`PriceRecord`]s.
pub struct DiskRecordStore {
    keyspace: Keyspace,
    records: PartitionHandle,
    next_seq: AtomicU64,
}

impl DiskRecordStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            StatsError::Store(format!(
                "Failed to create store directory {}: {e}",
                path.display()
            ))
        })?;

        let keyspace = Config::new(path).open()?;
        let records = keyspace.open_partition(RECORDS_PARTITION, PartitionCreateOptions::default())?;
        let next_seq = AtomicU64::new(records.len()? as u64);
        debug!("Opened record store at {}", path.display());

        Ok(Self {
            keyspace,
            records,
            next_seq,
        })
    }

    fn key_prefix(currency_code: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(currency_code.len() + 1);
        prefix.extend_from_slice(currency_code.as_bytes());
        prefix.push(0);
        prefix
    }

    fn record_key(currency_code: &str, seq: u64) -> Vec<u8> {
        let mut key = Self::key_prefix(currency_code);
        key.extend_from_slice(&seq.to_be_bytes());
        key
    }
}

#[async_trait]
impl RecordStore for DiskRecordStore {
    async fn count(&self) -> Result<usize> {
        Ok(self.records.len()?)
    }

    async fn find_all(&self) -> Result<Vec<PriceRecord>> {
        let mut found = Vec::new();
        for item in self.records.iter() {
            let (_, value) = item?;
            found.push(serde_json::from_slice(&value)?);
        }
        debug!("Store READ {} records", found.len());
        Ok(found)
    }

    async fn find_by_currency_code(&self, currency_code: &str) -> Result<Vec<PriceRecord>> {
        let mut found = Vec::new();
        for item in self.records.prefix(Self::key_prefix(currency_code)) {
            let (_, value) = item?;
            found.push(serde_json::from_slice(&value)?);
        }
        debug!("Store READ {} records for {}", found.len(), currency_code);
        Ok(found)
    }

    async fn save_all(&self, records: &[PriceRecord]) -> Result<()> {
        let mut batch = self.keyspace.batch();
        for record in records {
            let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
            batch.insert(
                &self.records,
                Self::record_key(&record.currency_code, seq),
                serde_json::to_vec(record)?,
            );
        }
        batch.commit()?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Store SAVE {} records", records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_store_save_and_find() {
        let dir = tempdir().unwrap();
        let store = DiskRecordStore::open(dir.path()).unwrap();

        // Initially, store is empty
        assert_eq!(store.count().await.unwrap(), 0);

        store
            .save_all(&[
                PriceRecord::new("BTC", 1641009600000, dec!(46813.21)),
                PriceRecord::new("BTCX", 1641009600000, dec!(1)),
                PriceRecord::new("BTC", 1641020400000, dec!(46979.61)),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);

        // Prefix scan must not pick up codes that merely start with "BTC"
        let btc = store.find_by_currency_code("BTC").await.unwrap();
        assert_eq!(btc.len(), 2);
        assert_eq!(btc[0].price, dec!(46813.21));
        assert_eq!(btc[1].price, dec!(46979.61));

        assert!(store.find_by_currency_code("ETH").await.unwrap().is_empty());
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = DiskRecordStore::open(dir.path()).unwrap();
            store
                .save_all(&[PriceRecord::new("ETH", 1, dec!(3715.32))])
                .await
                .unwrap();
        }

        let store = DiskRecordStore::open(dir.path()).unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        // New writes after reopen must not overwrite existing keys
        store
            .save_all(&[PriceRecord::new("ETH", 1, dec!(3715.32))])
            .await
            .unwrap();
        assert_eq!(store.find_by_currency_code("ETH").await.unwrap().len(), 2);
    }
}
