use crate::core::error::Result;
use crate::core::loader::CsvLoader;
use crate::core::price::PriceRecord;
use crate::core::store::RecordStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Immutable view of the records cached for one currency.
pub type RecordSnapshot = Arc<Vec<PriceRecord>>;

/// In-memory index of price records by currency code, backed by a
/// [`RecordStore`].
///
/// An entry is created once, at startup or on the first lookup or append for
/// its code, and afterwards only grows through [`RecordCache::add_records`].
/// Appends swap in a new snapshot, so readers holding an older one are never
/// disturbed.
pub struct RecordCache {
    store: Arc<dyn RecordStore>,
    inner: RwLock<HashMap<String, RecordSnapshot>>,
}

impl RecordCache {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Fills the cache at startup. An empty store is seeded from `loader`
    /// first; otherwise every stored record is read back.
    ///
    /// Returns the number of records cached.
    pub async fn initialize(&self, loader: &CsvLoader) -> Result<usize> {
        let records = if self.store.count().await? == 0 {
            info!("Record store is empty, seeding from price files");
            let records = loader.load()?;
            self.save(&records).await?;
            records
        } else {
            info!("Loading price records from store");
            self.store.find_all().await?
        };

        let total = records.len();
        self.merge(records).await;
        info!("Cache initialized with {} records", total);
        Ok(total)
    }

    /// Returns the records for `currency_code`, querying the store on the
    /// first lookup. The fetched list is cached even when empty.
    pub async fn get_records(&self, currency_code: &str) -> Result<RecordSnapshot> {
        if let Some(records) = self.inner.read().await.get(currency_code) {
            debug!("Cache HIT for {}", currency_code);
            return Ok(Arc::clone(records));
        }

        debug!("Cache MISS for {}", currency_code);
        let fetched = Arc::new(self.store.find_by_currency_code(currency_code).await?);

        let mut cache = self.inner.write().await;
        let entry = cache
            .entry(currency_code.to_string())
            .or_insert_with(|| {
                debug!("Cache PUT for {}", currency_code);
                fetched
            });
        Ok(Arc::clone(entry))
    }

    /// Persists `records` and appends them to their currencies' entries.
    ///
    /// A currency without an entry is read back from the store after the
    /// save, so its older stored records are kept alongside the new ones.
    pub async fn add_records(&self, records: Vec<PriceRecord>) -> Result<()> {
        self.save(&records).await?;

        let mut cache = self.inner.write().await;
        for (code, new_records) in group_by_code(records) {
            if let Some(entry) = cache.get_mut(&code) {
                debug!("Cache APPEND {} records for {}", new_records.len(), code);
                let mut merged = Vec::with_capacity(entry.len() + new_records.len());
                merged.extend(entry.iter().cloned());
                merged.extend(new_records);
                *entry = Arc::new(merged);
                continue;
            }

            let stored = self.store.find_by_currency_code(&code).await?;
            debug!("Cache PUT for {} with {} records", code, stored.len());
            cache.insert(code, Arc::new(stored));
        }
        Ok(())
    }

    /// Currency codes that currently have an entry.
    pub async fn cached_currencies(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.inner.read().await.keys().cloned().collect();
        codes.sort();
        codes
    }

    async fn save(&self, records: &[PriceRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.store.save_all(records).await
    }

    async fn merge(&self, records: Vec<PriceRecord>) {
        if records.is_empty() {
            return;
        }

        let mut cache = self.inner.write().await;
        for (code, new_records) in group_by_code(records) {
            debug!("Cache APPEND {} records for {}", new_records.len(), code);
            let entry = cache.entry(code).or_default();
            let mut merged = Vec::with_capacity(entry.len() + new_records.len());
            merged.extend(entry.iter().cloned());
            merged.extend(new_records);
            *entry = Arc::new(merged);
        }
    }
}

fn group_by_code(records: Vec<PriceRecord>) -> HashMap<String, Vec<PriceRecord>> {
    let mut grouped: HashMap<String, Vec<PriceRecord>> = HashMap::new();
    for record in records {
        grouped
            .entry(record.currency_code.clone())
            .or_default()
            .push(record);
    }
    grouped
}
