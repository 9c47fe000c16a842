//! Aggregate statistics over cached price records.
//!
//! All arithmetic is done on [`Decimal`] values. Per-currency stats carry
//! prices and timestamps but no normalized range; the ranking and the
//! per-day query carry only the normalized range.
use crate::core::cache::RecordCache;
use crate::core::error::{Result, StatsError};
use crate::core::price::{CurrencyStats, PriceRecord, format_timestamp};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use futures::future::try_join_all;
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

const NORMALIZED_RANGE_SCALE: u32 = 5;

// Longest span searched for an existing local time around a DST gap
const MAX_GAP_MINUTES: u32 = 24 * 60;

/// `(max - min) / min` rounded half-up to 5 decimal places.
///
/// Zero when either bound is missing or `min` is zero. A range too large to
/// represent saturates at [`Decimal::MAX`].
pub fn normalized_range(min: Option<Decimal>, max: Option<Decimal>) -> Decimal {
    match (min, max) {
        (Some(min), Some(max)) if !min.is_zero() => max
            .checked_sub(min)
            .and_then(|spread| spread.checked_div(min))
            .unwrap_or(Decimal::MAX)
            .round_dp_with_strategy(NORMALIZED_RANGE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        _ => Decimal::ZERO,
    }
}

fn min_price(records: &[PriceRecord]) -> Decimal {
    records
        .iter()
        .map(|r| r.price)
        .min()
        .unwrap_or(Decimal::ZERO)
}

fn max_price(records: &[PriceRecord]) -> Decimal {
    records
        .iter()
        .map(|r| r.price)
        .max()
        .unwrap_or(Decimal::ZERO)
}

fn oldest(records: &[PriceRecord]) -> Option<&PriceRecord> {
    records.iter().min_by_key(|r| r.timestamp)
}

fn newest(records: &[PriceRecord]) -> Option<&PriceRecord> {
    records.iter().max_by_key(|r| r.timestamp)
}

/// Orders ranges so that a missing range compares lowest.
fn compare_ranges(a: &CurrencyStats, b: &CurrencyStats) -> Ordering {
    a.normalized_range.cmp(&b.normalized_range)
}

fn local_millis(date_time: NaiveDateTime, earliest: bool) -> Option<i64> {
    let local = Local.from_local_datetime(&date_time);
    let resolved = if earliest {
        local.earliest()
    } else {
        local.latest()
    };
    resolved.map(|dt| dt.timestamp_millis())
}

/// Resolves `date_time` with `resolve`, stepping a minute at a time past
/// wall-clock times that do not exist (forward for a day's start, backward
/// for its end).
fn nearest_existing<F>(date_time: NaiveDateTime, forward: bool, resolve: F) -> Option<i64>
where
    F: Fn(NaiveDateTime) -> Option<i64>,
{
    let step = TimeDelta::minutes(if forward { 1 } else { -1 });
    let mut candidate = date_time;
    for _ in 0..=MAX_GAP_MINUTES {
        if let Some(millis) = resolve(candidate) {
            return Some(millis);
        }
        candidate = candidate.checked_add_signed(step)?;
    }
    None
}

/// Computes statistics for the configured currencies, reading records
/// through a shared [`RecordCache`].
pub struct StatsEngine {
    cache: Arc<RecordCache>,
    currencies: Vec<String>,
}

impl StatsEngine {
    pub fn new(cache: Arc<RecordCache>, currencies: Vec<String>) -> Self {
        Self { cache, currencies }
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Matches `currency_code` case-insensitively against the configured
    /// codes and returns the configured spelling.
    pub fn validate_currency_code(&self, currency_code: &str) -> Result<&str> {
        self.currencies
            .iter()
            .find(|c| c.eq_ignore_ascii_case(currency_code))
            .map(String::as_str)
            .ok_or_else(|| StatsError::UnsupportedCurrency(currency_code.to_string()))
    }

    /// Min, max, oldest and newest prices for one currency.
    pub async fn stats_for_currency(&self, currency_code: &str) -> Result<CurrencyStats> {
        let code = self.validate_currency_code(currency_code)?;
        let records = self.cache.get_records(code).await?;
        debug!("Computing stats for {} over {} records", code, records.len());

        let oldest_record = oldest(&records);
        let newest_record = newest(&records);
        Ok(CurrencyStats {
            currency_code: Some(code.to_string()),
            min_price: Some(min_price(&records)),
            max_price: Some(max_price(&records)),
            oldest_price: Some(oldest_record.map_or(Decimal::ZERO, |r| r.price)),
            newest_price: Some(newest_record.map_or(Decimal::ZERO, |r| r.price)),
            oldest_date_time: oldest_record.and_then(|r| format_timestamp(r.timestamp)),
            newest_date_time: newest_record.and_then(|r| format_timestamp(r.timestamp)),
            ..Default::default()
        })
    }

    /// Every configured currency with its normalized range, highest first.
    /// Equal ranges keep the configured order.
    pub async fn all_currencies_by_normalized_range(&self) -> Result<Vec<CurrencyStats>> {
        let snapshots = try_join_all(
            self.currencies
                .iter()
                .map(|code| self.cache.get_records(code)),
        )
        .await?;

        let mut stats: Vec<CurrencyStats> = self
            .currencies
            .iter()
            .zip(snapshots)
            .map(|(code, records)| {
                let range =
                    normalized_range(Some(min_price(&records)), Some(max_price(&records)));
                debug!("Normalized range for {}: {}", code, range);
                CurrencyStats {
                    currency_code: Some(code.clone()),
                    normalized_range: Some(range),
                    ..Default::default()
                }
            })
            .collect();

        stats.sort_by(|a, b| compare_ranges(b, a));
        Ok(stats)
    }

    /// The currency with the highest normalized range among records stamped
    /// on the given local calendar day, or `None` when no currency has data
    /// for that day.
    pub async fn highest_normalized_range_on_date(
        &self,
        day: u32,
        month: u32,
        year: i32,
    ) -> Result<Option<CurrencyStats>> {
        let invalid = || StatsError::InvalidDate { day, month, year };
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let from = date
            .and_hms_milli_opt(0, 0, 0, 0)
            .and_then(|dt| nearest_existing(dt, true, |t| local_millis(t, true)))
            .ok_or_else(invalid)?;
        let to = date
            .and_hms_milli_opt(23, 59, 59, 999)
            .and_then(|dt| nearest_existing(dt, false, |t| local_millis(t, false)))
            .ok_or_else(invalid)?;
        debug!("Filtering records for {} between {} and {}", date, from, to);

        let snapshots = try_join_all(
            self.currencies
                .iter()
                .map(|code| self.cache.get_records(code)),
        )
        .await?;

        let mut highest: Option<CurrencyStats> = None;
        for records in snapshots {
            let in_range: Vec<PriceRecord> = records
                .iter()
                .filter(|r| r.timestamp >= from && r.timestamp <= to)
                .cloned()
                .collect();
            let Some(first) = in_range.first() else {
                continue;
            };

            let candidate = CurrencyStats {
                currency_code: Some(first.currency_code.clone()),
                normalized_range: Some(normalized_range(
                    Some(min_price(&in_range)),
                    Some(max_price(&in_range)),
                )),
                ..Default::default()
            };

            // Strictly greater keeps the first currency on ties
            let replace = highest
                .as_ref()
                .is_none_or(|best| compare_ranges(&candidate, best) == Ordering::Greater);
            if replace {
                highest = Some(candidate);
            }
        }

        Ok(highest)
    }

    /// Persists new records and makes them visible to later stats calls.
    ///
    /// Every record must belong to a configured currency and carry a
    /// non-negative price; codes are rewritten to the configured spelling.
    /// Nothing is stored if any record is rejected.
    pub async fn add_new_data(&self, records: Vec<PriceRecord>) -> Result<()> {
        let records = records
            .into_iter()
            .map(|mut record| {
                record.currency_code = self.validate_currency_code(&record.currency_code)?.to_string();
                if record.price < Decimal::ZERO {
                    return Err(StatsError::NegativePrice {
                        currency_code: record.currency_code,
                        price: record.price,
                    });
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Adding {} new records", records.len());
        self.cache.add_records(records).await
    }
}
