//! Building a [`PriceHistory`] from a close-price source.

use crate::cache::PriceCache;
use crate::error::{DataError, Result};
use chrono::{NaiveDate, TimeDelta};
use correlheat_analysis::{PriceHistory, PricePoint};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

/// Configuration for data fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Calendar days to look back when no start date is given (default: 365)
    pub lookback_days: i64,
    /// Delay after each provider request (default: 1s)
    pub rate_limit_delay: StdDuration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            rate_limit_delay: StdDuration::from_millis(1000),
        }
    }
}

/// Inclusive calendar date range with `start` strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidDateRange`] unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The `days`-long range ending on `end`.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidDateRange`] if `days` is not positive or
    /// reaches past the earliest representable date.
    pub fn lookback(end: NaiveDate, days: i64) -> Result<Self> {
        let start = TimeDelta::try_days(days)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| DataError::InvalidDateRange {
                start: format!("{days} days before {end}"),
                end: end.to_string(),
            })?;
        Self::new(start, end)
    }

    /// First date of the range.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the range.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            start: NaiveDate,
            end: NaiveDate,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

/// A source of daily closing prices.
pub trait CloseSource {
    /// Fetch daily closes for `symbol` between `range.start()` and
    /// `range.end()` inclusive.
    ///
    /// Implementations may return points in any order and may include
    /// duplicate or non-positive closes; [`load_price_history`] cleans them.
    fn fetch_closes(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<PricePoint>>>;
}

/// Trim, uppercase and de-duplicate ticker symbols, keeping first
/// occurrences in order.
///
/// # Errors
/// Returns [`DataError::InvalidSymbol`] if no symbol remains.
pub fn normalize_tickers<I, S>(tickers: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let cleaned: Vec<String> = tickers
        .into_iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect();

    if cleaned.is_empty() {
        return Err(DataError::InvalidSymbol(
            "at least one ticker symbol must be provided".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Fetch closes for every ticker into a [`PriceHistory`].
///
/// Tickers are normalised with [`normalize_tickers`]. Each symbol is looked
/// up in `cache` first and fetched from `source` otherwise. Symbols that
/// fail or return nothing are skipped with a warning. `on_progress` is
/// called once per symbol after it has been handled.
///
/// # Errors
/// Returns [`DataError::MissingData`] if no symbol yielded any price.
pub async fn load_price_history<S, F>(
    source: &S,
    cache: &mut PriceCache,
    tickers: &[String],
    range: DateRange,
    mut on_progress: F,
) -> Result<PriceHistory>
where
    S: CloseSource,
    F: FnMut(&str),
{
    let symbols = normalize_tickers(tickers)?;
    let mut history = PriceHistory::new();

    for symbol in symbols.iter().map(String::as_str) {
        let points = if let Some(cached) = cache.get(symbol, range) {
            debug!(symbol, points = cached.len(), "price cache hit");
            cached.to_vec()
        } else {
            match source.fetch_closes(symbol, range).await {
                Ok(raw) => {
                    let cleaned = clean_closes(raw);
                    cache.insert(symbol, range, cleaned.clone());
                    cleaned
                }
                Err(e) => {
                    warn!(symbol, error = %e, "failed to fetch prices, skipping");
                    on_progress(symbol);
                    continue;
                }
            }
        };

        if points.is_empty() {
            warn!(symbol, "no usable prices returned, skipping");
        } else {
            history.insert(symbol, points)?;
        }
        on_progress(symbol);
    }

    if history.is_empty() {
        return Err(DataError::MissingData {
            symbol: symbols.join(","),
            reason: "no price data was retrieved for the requested tickers".to_string(),
        });
    }

    info!(
        requested = symbols.len(),
        loaded = history.len(),
        start = %range.start(),
        end = %range.end(),
        "price history loaded"
    );
    Ok(history)
}

/// Sort by date, keep the last close per date and drop unusable prices.
fn clean_closes(raw: Vec<PricePoint>) -> Vec<PricePoint> {
    let by_date: BTreeMap<NaiveDate, f64> = raw
        .into_iter()
        .filter(|p| p.price.is_finite() && p.price > 0.0)
        .map(|p| (p.date, p.price))
        .collect();

    by_date
        .into_iter()
        .map(|(date, price)| PricePoint::new(date, price))
        .collect()
}
