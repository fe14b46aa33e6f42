//! Daily return calculation.
//!
//! Two return definitions are supported:
//! - log return: ln(p_t / p_{t-1})
//! - percentage return: p_t / p_{t-1} - 1
//!
//! Each return is stamped with the later of the two dates it spans, so a
//! price series of length N yields N - 1 returns.

use crate::error::{AnalysisError, Result};
use crate::price::{PriceHistory, PricePoint};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which return definition to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    /// Natural-log returns
    #[default]
    Log,
    /// Simple (arithmetic) returns
    #[serde(alias = "pct")]
    Percentage,
}

impl ReturnKind {
    /// All supported return kinds.
    pub const fn all() -> [Self; 2] {
        [Self::Log, Self::Percentage]
    }

    /// Short name used on the command line and in exports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Percentage => "percentage",
        }
    }

    /// Apply the return formula to a pair of consecutive prices.
    pub fn apply(&self, previous: f64, current: f64) -> f64 {
        match self {
            Self::Log => (current / previous).ln(),
            Self::Percentage => current / previous - 1.0,
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReturnKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "percentage" | "pct" => Ok(Self::Percentage),
            _ => Err(AnalysisError::InvalidReturnKind(s.to_string())),
        }
    }
}

/// A single daily return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Date of the later price in the pair.
    pub date: NaiveDate,
    /// Return value.
    pub value: f64,
}

impl ReturnPoint {
    /// Create a new return point.
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ticker → date-ordered daily returns.
///
/// Values are finite and dates strictly ascending, whether the series was
/// built with [`insert`](Self::insert) or deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnSeries {
    series: BTreeMap<String, Vec<ReturnPoint>>,
}

impl ReturnSeries {
    /// Create an empty set of return series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a return series.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidSeries`] if a value is not finite or
    /// dates are not strictly ascending.
    pub fn insert(&mut self, ticker: impl Into<String>, points: Vec<ReturnPoint>) -> Result<()> {
        let ticker = ticker.into();

        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: format!("non-finite return on {}", bad.date),
            });
        }

        if points.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: "return dates must be strictly ascending".to_string(),
            });
        }

        self.series.insert(ticker, points);
        Ok(())
    }

    /// Get the returns for a ticker.
    pub fn get(&self, ticker: &str) -> Option<&[ReturnPoint]> {
        self.series.get(ticker).map(Vec::as_slice)
    }

    /// Tickers in sorted order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Iterate over `(ticker, returns)` pairs in ticker order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReturnPoint])> {
        self.series
            .iter()
            .map(|(ticker, points)| (ticker.as_str(), points.as_slice()))
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether there are no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl<'de> Deserialize<'de> for ReturnSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            series: BTreeMap<String, Vec<ReturnPoint>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut returns = Self::new();
        for (ticker, points) in raw.series {
            returns
                .insert(ticker, points)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(returns)
    }
}

/// Compute returns for a single date-ordered price series.
///
/// Returns an empty vector when fewer than two prices are given.
pub fn compute_series_returns(prices: &[PricePoint], kind: ReturnKind) -> Vec<ReturnPoint> {
    prices
        .windows(2)
        .map(|w| ReturnPoint::new(w[1].date, kind.apply(w[0].price, w[1].price)))
        .collect()
}

/// Compute return series for every ticker in a price history.
///
/// Tickers with fewer than two prices produce no series and are left out
/// of the result. Returns that overflow to a non-finite value (extreme
/// price ratios) are dropped; a ticker left with no returns is omitted.
pub fn compute_returns(history: &PriceHistory, kind: ReturnKind) -> ReturnSeries {
    let mut out = ReturnSeries::new();

    for (ticker, prices) in history.iter() {
        if prices.len() < 2 {
            debug!(ticker, observations = prices.len(), "dropping ticker with fewer than two prices");
            continue;
        }

        let raw = compute_series_returns(prices, kind);
        let computed = raw.len();
        let returns: Vec<ReturnPoint> = raw.into_iter().filter(|r| r.value.is_finite()).collect();
        if returns.len() < computed {
            debug!(ticker, dropped = computed - returns.len(), "dropping non-finite returns");
        }
        if returns.is_empty() {
            continue;
        }
        out.series.insert(ticker.to_string(), returns);
    }

    out
}
