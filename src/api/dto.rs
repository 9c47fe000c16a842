//! JSON shapes returned by the HTTP API.

use crate::core::CurrencyStats;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    pub statistics: StatsDto,
}

/// Statistics block; fields an operation did not compute are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_range: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest_date_time: Option<String>,
}

impl From<CurrencyStats> for CryptoDto {
    fn from(stats: CurrencyStats) -> Self {
        CryptoDto {
            currency_code: stats.currency_code,
            statistics: StatsDto {
                min_price: stats.min_price,
                max_price: stats.max_price,
                oldest_price: stats.oldest_price,
                newest_price: stats.newest_price,
                normalized_range: stats.normalized_range,
                oldest_date_time: stats.oldest_date_time,
                newest_date_time: stats.newest_date_time,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_absent_fields_are_omitted() {
        let dto = CryptoDto::from(CurrencyStats {
            currency_code: Some("ETH".to_string()),
            normalized_range: Some(dec!(0.16667)),
            ..Default::default()
        });

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currency_code": "ETH",
                "statistics": { "normalized_range": "0.16667" }
            })
        );
    }
}
