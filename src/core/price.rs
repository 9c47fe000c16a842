//! Price records and the statistics derived from them

use chrono::{Local, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const DATE_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// A single price observation for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub currency_code: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub price: Decimal,
}

impl PriceRecord {
    pub fn new(currency_code: impl Into<String>, timestamp: i64, price: Decimal) -> Self {
        Self {
            currency_code: currency_code.into(),
            timestamp,
            price,
        }
    }
}

/// Aggregates computed over a set of price records.
///
/// Each stats operation fills in a different subset of the optional fields,
/// so consumers should treat `None` as "not computed" rather than "zero".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyStats {
    pub currency_code: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub oldest_price: Option<Decimal>,
    pub newest_price: Option<Decimal>,
    pub normalized_range: Option<Decimal>,
    pub oldest_date_time: Option<String>,
    pub newest_date_time: Option<String>,
}

/// Formats an epoch-millisecond timestamp in the local timezone.
///
/// Returns `None` for non-positive or out-of-range timestamps.
pub fn format_timestamp(timestamp: i64) -> Option<String> {
    if timestamp <= 0 {
        return None;
    }
    Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_timestamp_uses_local_time() {
        let dt = Local.with_ymd_and_hms(2022, 1, 1, 4, 5, 6).single().unwrap();
        assert_eq!(
            format_timestamp(dt.timestamp_millis()),
            Some("01-01-2022 04:05:06".to_string())
        );
    }

    #[test]
    fn test_format_timestamp_rejects_non_positive() {
        assert_eq!(format_timestamp(0), None);
        assert_eq!(format_timestamp(-5), None);
    }

    #[test]
    fn test_record_serializes_price_as_string() {
        let record = PriceRecord::new("BTC", 1641009600000, dec!(46813.21));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["price"], "46813.21");

        let back: PriceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
