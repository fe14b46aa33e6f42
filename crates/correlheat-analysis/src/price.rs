//! Daily price history per ticker.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Ticker → date-ordered closing prices.
///
/// Every series held here has strictly ascending dates and positive, finite
/// prices. [`insert`](Self::insert) rejects anything else, so downstream
/// calculations never need to re-sort or re-validate. Deserialization goes
/// through the same checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceHistory {
    series: BTreeMap<String, Vec<PricePoint>>,
}

impl PriceHistory {
    /// Create an empty price history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the price series for a ticker.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidSeries`] if the ticker is blank, a
    /// price is not a positive finite number, or dates are not strictly
    /// ascending.
    pub fn insert(&mut self, ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<()> {
        let ticker = ticker.into();
        if ticker.trim().is_empty() {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: "ticker symbol is empty".to_string(),
            });
        }

        if let Some(bad) = points.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: format!("non-positive or non-finite price {} on {}", bad.price, bad.date),
            });
        }

        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: format!(
                    "dates must be strictly ascending ({} followed by {})",
                    pair[0].date, pair[1].date
                ),
            });
        }

        self.series.insert(ticker, points);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_series(mut self, ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        self.insert(ticker, points)?;
        Ok(self)
    }

    /// Get the price series for a ticker.
    pub fn get(&self, ticker: &str) -> Option<&[PricePoint]> {
        self.series.get(ticker).map(Vec::as_slice)
    }

    /// Whether the history contains a ticker.
    pub fn contains(&self, ticker: &str) -> bool {
        self.series.contains_key(ticker)
    }

    /// Tickers in sorted order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Iterate over `(ticker, series)` pairs in ticker order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PricePoint])> {
        self.series
            .iter()
            .map(|(ticker, points)| (ticker.as_str(), points.as_slice()))
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the history holds no tickers.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Copy out the series for the given tickers.
    ///
    /// Returns the selected history and the requested tickers that were
    /// not present.
    pub fn select<S: AsRef<str>>(&self, tickers: &[S]) -> (Self, Vec<String>) {
        let mut selected = Self::new();
        let mut missing = Vec::new();

        for ticker in tickers {
            let ticker = ticker.as_ref();
            match self.series.get(ticker) {
                Some(points) => {
                    selected.series.insert(ticker.to_string(), points.clone());
                }
                None => missing.push(ticker.to_string()),
            }
        }

        (selected, missing)
    }
}

impl<'de> Deserialize<'de> for PriceHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            series: BTreeMap<String, Vec<PricePoint>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut history = Self::new();
        for (ticker, points) in raw.series {
            history
                .insert(ticker, points)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(history)
    }
}
