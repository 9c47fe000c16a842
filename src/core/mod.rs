//! Core business logic: records, caching and statistics

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod log;
pub mod price;
pub mod stats;
pub mod store;

// Re-export main types for cleaner imports
pub use cache::RecordCache;
pub use error::{Result, StatsError};
pub use price::{CurrencyStats, PriceRecord};
pub use stats::StatsEngine;
pub use store::RecordStore;
