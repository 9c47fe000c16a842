//! Error types for the statistics core.

use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Requested currency code is not in the configured allow-list
    #[error("Unsupported currency code: {0}")]
    UnsupportedCurrency(String),

    /// A bootstrap price file is missing or unreadable
    #[error("Failed to read price file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record store read or write failure
    #[error("Record store error: {0}")]
    Store(String),

    /// Added records must not carry a negative price
    #[error("Negative price {price} for {currency_code}")]
    NegativePrice {
        currency_code: String,
        price: Decimal,
    },

    #[error("Invalid date: {day:02}-{month:02}-{year}")]
    InvalidDate { day: u32, month: u32, year: i32 },
}

impl From<fjall::Error> for StatsError {
    fn from(err: fjall::Error) -> Self {
        StatsError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
