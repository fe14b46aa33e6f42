//! Ticker baskets.
//!
//! A [`Basket`] is the validated list of symbols an analysis runs over:
//! upper-cased, de-duplicated in first-seen order, and at least two long.

use crate::error::{Error, Result};
use correlheat_data::normalize_tickers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Basket used when the caller names no tickers.
pub const DEFAULT_TICKERS: [&str; 4] = ["AAPL", "MSFT", "GOOGL", "NVDA"];

/// Minimum number of distinct tickers in a basket.
pub const MIN_TICKERS: usize = 2;

/// A validated list of ticker symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Basket {
    tickers: Vec<String>,
}

impl Basket {
    /// Build a basket from individual symbols.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBasket`] if fewer than [`MIN_TICKERS`]
    /// distinct non-blank symbols remain after normalisation.
    pub fn new<I, S>(tickers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tickers =
            normalize_tickers(tickers).map_err(|_| Error::InvalidBasket("no tickers".to_string()))?;

        if tickers.len() < MIN_TICKERS {
            return Err(Error::InvalidBasket(tickers.join(", ")));
        }
        Ok(Self { tickers })
    }

    /// Parse free-form text where symbols are separated by commas,
    /// whitespace or newlines.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::new(raw.split(|c: char| c == ',' || c.is_whitespace()))
    }

    /// Symbols in request order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Always false for a constructed basket.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Whether the basket holds `symbol` (case-insensitive).
    pub fn contains(&self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        self.tickers.iter().any(|t| *t == symbol)
    }
}

impl Default for Basket {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl FromStr for Basket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<String>> for Basket {
    type Error = Error;

    fn try_from(tickers: Vec<String>) -> Result<Self> {
        Self::new(tickers)
    }
}

impl From<Basket> for Vec<String> {
    fn from(basket: Basket) -> Self {
        basket.tickers
    }
}

impl fmt::Display for Basket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tickers.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AAPL, MSFT, GOOGL, NVDA", &["AAPL", "MSFT", "GOOGL", "NVDA"])]
    #[case("aapl msft", &["AAPL", "MSFT"])]
    #[case("aapl,,msft\nnvda", &["AAPL", "MSFT", "NVDA"])]
    #[case("  tsla\t f , tsla ", &["TSLA", "F"])]
    fn test_parse(#[case] raw: &str, #[case] expected: &[&str]) {
        let basket = Basket::parse(raw).unwrap();
        assert_eq!(basket.tickers(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(" , ,\n")]
    #[case("AAPL")]
    #[case("aapl, AAPL")]
    fn test_parse_rejects_small_baskets(#[case] raw: &str) {
        assert!(matches!(Basket::parse(raw), Err(Error::InvalidBasket(_))));
    }

    #[test]
    fn test_default_basket() {
        let basket = Basket::default();
        assert_eq!(basket.len(), 4);
        assert!(basket.contains("googl"));
        assert!(!basket.contains("TSLA"));
        assert_eq!(basket.to_string(), "AAPL, MSFT, GOOGL, NVDA");
    }

    #[test]
    fn test_from_str() {
        let basket: Basket = "xom cvx".parse().unwrap();
        assert_eq!(basket.tickers(), ["XOM", "CVX"]);
    }

    #[test]
    fn test_serde_validates() {
        let basket: Basket = serde_json::from_str(r#"["spy", "qqq"]"#).unwrap();
        assert_eq!(basket.tickers(), ["SPY", "QQQ"]);
        assert_eq!(serde_json::to_string(&basket).unwrap(), r#"["SPY","QQQ"]"#);

        assert!(serde_json::from_str::<Basket>(r#"["spy"]"#).is_err());
    }
}
