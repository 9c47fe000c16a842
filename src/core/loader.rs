//! Seeds price records from `<CODE>_values.csv` files.
//!
//! Each file holds rows of `timestamp,currencyCode,price`. Rows that do not
//! have exactly three fields, or whose timestamp or price is not numeric, are
//! dropped. A header line such as `timestamp,symbol,price` falls out through
//! the same rule.

use crate::core::error::{Result, StatsError};
use crate::core::price::PriceRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const FILE_NAME_SUFFIX: &str = "_values.csv";

/// Reads the raw comma-separated rows of a file, keeping only 3-field rows.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let file_access = |source: std::io::Error| StatsError::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(file_access)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| file_access(e.into()))?;
        if record.len() != 3 {
            debug!("Dropping row with {} fields in {}", record.len(), path.display());
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Converts a `timestamp,currencyCode,price` row into a record.
///
/// Returns `None` when the timestamp is not an integer or the price is not a
/// non-negative decimal (plain or scientific notation).
pub fn parse_row(row: &[String]) -> Option<PriceRecord> {
    let [timestamp, currency_code, price] = row else {
        return None;
    };
    let timestamp = timestamp.parse::<i64>().ok()?;
    let price = Decimal::from_str(price)
        .or_else(|_| Decimal::from_scientific(price))
        .ok()?;
    if price.is_sign_negative() || currency_code.is_empty() {
        return None;
    }
    Some(PriceRecord::new(
        currency_code.to_uppercase(),
        timestamp,
        price,
    ))
}

/// Loads records for a set of currencies from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    prices_dir: PathBuf,
    currencies: Vec<String>,
}

impl CsvLoader {
    pub fn new(prices_dir: impl Into<PathBuf>, currencies: Vec<String>) -> Self {
        Self {
            prices_dir: prices_dir.into(),
            currencies,
        }
    }

    pub fn file_path(&self, currency_code: &str) -> PathBuf {
        self.prices_dir
            .join(format!("{currency_code}{FILE_NAME_SUFFIX}"))
    }

    /// Reads every configured currency file in order and concatenates the
    /// valid records. Fails on the first file that cannot be read.
    pub fn load(&self) -> Result<Vec<PriceRecord>> {
        let mut records = Vec::new();
        for code in &self.currencies {
            let records_in_file = read_records(&self.file_path(code))?;
            debug!("Loaded {} records for {}", records_in_file.len(), code);
            records.extend(records_in_file);
        }
        info!(
            "Loaded {} price records from {}",
            records.len(),
            self.prices_dir.display()
        );
        Ok(records)
    }
}

/// Reads a single CSV file into records, dropping invalid rows.
pub fn read_records(path: &Path) -> Result<Vec<PriceRecord>> {
    let rows = read_rows(path)?;
    let total = rows.len();
    let records: Vec<PriceRecord> = rows.iter().filter_map(|row| parse_row(row)).collect();
    if records.len() < total {
        debug!(
            "Dropped {} invalid rows from {}",
            total - records.len(),
            path.display()
        );
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_parse_row_valid() {
        let record = parse_row(&row(&["1641009600000", "BTC", "46813.21"])).unwrap();
        assert_eq!(record.currency_code, "BTC");
        assert_eq!(record.timestamp, 1641009600000);
        assert_eq!(record.price, dec!(46813.21));
    }

    #[test]
    fn test_parse_row_accepts_scientific_price() {
        let record = parse_row(&row(&["1641009600000", "doge", "1.5e-1"])).unwrap();
        assert_eq!(record.currency_code, "DOGE");
        assert_eq!(record.price, dec!(0.15));
    }

    #[test]
    fn test_parse_row_rejects_non_numeric_fields() {
        assert!(parse_row(&row(&["timestamp", "symbol", "price"])).is_none());
        assert!(parse_row(&row(&["1641009600000", "BTC", "abc"])).is_none());
        assert!(parse_row(&row(&["16410.5", "BTC", "1.0"])).is_none());
        assert!(parse_row(&row(&["1641009600000", "BTC", "-1.0"])).is_none());
        assert!(parse_row(&row(&["1641009600000", "BTC"])).is_none());
    }

    #[test]
    fn test_read_rows_drops_wrong_field_count() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("BTC_values.csv");
        fs::write(
            &path,
            "timestamp,symbol,price\n1641009600000,BTC,46813.21\n1641020400000,BTC\n1,2,3,4\n",
        )?;

        let rows = read_rows(&path)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], row(&["1641009600000", "BTC", "46813.21"]));
        Ok(())
    }

    #[test]
    fn test_load_concatenates_files_in_config_order() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("BTC_values.csv"),
            "timestamp,symbol,price\n1641009600000,BTC,46813.21\n1641020400000,BTC,46979.61\n",
        )?;
        fs::write(
            dir.path().join("ETH_values.csv"),
            "1641009600000,ETH,3715.32\nbroken,ETH,1\n",
        )?;

        let loader = CsvLoader::new(dir.path(), vec!["ETH".to_string(), "BTC".to_string()]);
        let records = loader.load()?;

        let codes: Vec<&str> = records.iter().map(|r| r.currency_code.as_str()).collect();
        assert_eq!(codes, vec!["ETH", "BTC", "BTC"]);
        assert_eq!(records[0].price, dec!(3715.32));
        Ok(())
    }

    #[test]
    fn test_load_fails_on_missing_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("BTC_values.csv"), "1641009600000,BTC,1\n")?;

        let loader = CsvLoader::new(dir.path(), vec!["BTC".to_string(), "XRP".to_string()]);
        match loader.load() {
            Err(StatsError::FileAccess { path, .. }) => {
                assert!(path.ends_with("XRP_values.csv"));
            }
            other => panic!("Expected FileAccess error, got {other:?}"),
        }
        Ok(())
    }
}
