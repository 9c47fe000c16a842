pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::RecordStore;
use anyhow::{Context, Result};
use disk::DiskRecordStore;
use memory::MemoryRecordStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the record store for this configuration.
///
/// `ephemeral` selects an in-memory store that is discarded on exit, which
/// means the price files are re-read on every run.
pub fn open_record_store(config: &AppConfig, ephemeral: bool) -> Result<Arc<dyn RecordStore>> {
    if ephemeral {
        debug!("Using in-memory record store");
        return Ok(Arc::new(MemoryRecordStore::new()));
    }

    let path = config.data_path()?.join("records");
    let store = DiskRecordStore::open(&path)
        .with_context(|| format!("Failed to open record store at {}", path.display()))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PriceRecord;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn config_with_data_path(path: &std::path::Path) -> AppConfig {
        AppConfig {
            currencies: vec!["BTC".to_string()],
            prices_dir: None,
            data_path: Some(path.to_string_lossy().to_string()),
            server: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_open_disk_store_under_data_path() {
        let dir = tempdir().unwrap();
        let config = config_with_data_path(dir.path());

        let store = open_record_store(&config, false).unwrap();
        store
            .save_all(&[PriceRecord::new("BTC", 1, dec!(1))])
            .await
            .unwrap();

        assert!(dir.path().join("records").exists());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_ephemeral_store() {
        let dir = tempdir().unwrap();
        let config = config_with_data_path(dir.path());

        let store = open_record_store(&config, true).unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!dir.path().join("records").exists());
    }
}
