//! Daily close fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::loader::{CloseSource, DateRange, FetchConfig};
use chrono::{DateTime, NaiveDate, NaiveTime};
use correlheat_analysis::PricePoint;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider with default rate limiting (1 req/sec).
    ///
    /// # Errors
    /// Returns an error if the HTTP connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Create a provider using the rate limit from `config`.
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        Self::with_rate_limit(config.rate_limit_delay)
    }

    /// Create a provider with a custom delay after each request.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch adjusted daily closes for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AAPL")
    /// * `range` - Dates to fetch, both ends inclusive
    ///
    /// # Returns
    /// Price points in the order Yahoo returned them.
    pub async fn fetch_daily_closes(&self, symbol: &str, range: DateRange) -> Result<Vec<PricePoint>> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = to_offset_datetime(range.start(), start_of_day())?;
        let end_time = to_offset_datetime(range.end(), end_of_day())?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let points = quotes
            .iter()
            .map(|q| -> Result<PricePoint> {
                let timestamp = i64::try_from(q.timestamp)
                    .map_err(|e| DataError::TimeConversion(e.to_string()))?;
                let date = DateTime::from_timestamp(timestamp, 0)
                    .ok_or_else(|| {
                        DataError::TimeConversion(format!("timestamp {timestamp} out of range"))
                    })?
                    .date_naive();
                Ok(PricePoint::new(date, q.adjclose))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(symbol, quotes = points.len(), "fetched daily closes");

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(points)
    }
}

impl CloseSource for YahooQuoteProvider {
    async fn fetch_closes(&self, symbol: &str, range: DateRange) -> Result<Vec<PricePoint>> {
        self.fetch_daily_closes(symbol, range).await
    }
}

fn start_of_day() -> NaiveTime {
    NaiveTime::default()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}

fn to_offset_datetime(date: NaiveDate, at: NaiveTime) -> Result<time::OffsetDateTime> {
    let timestamp = date.and_time(at).and_utc().timestamp();
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_offset_conversion() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let start = to_offset_datetime(date, start_of_day()).unwrap();
        let end = to_offset_datetime(date, end_of_day()).unwrap();

        assert_eq!(start.unix_timestamp(), 1_704_153_600);
        assert_eq!(end.unix_timestamp() - start.unix_timestamp(), 86_399);
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::with_rate_limit(Duration::ZERO).unwrap();
        let result = provider
            .fetch_daily_closes("  ", range((2024, 1, 1), (2024, 2, 1)))
            .await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    #[ignore = "requires network access to Yahoo Finance"]
    async fn test_fetch_daily_closes() {
        let provider = YahooQuoteProvider::new().unwrap();
        let result = provider
            .fetch_daily_closes("AAPL", range((2024, 1, 1), (2024, 2, 1)))
            .await;

        let points = result.unwrap();
        assert!(points.len() > 15);
        assert!(points.iter().all(|p| p.price > 0.0));
    }
}
