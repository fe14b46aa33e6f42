//! End-to-end analysis: prices → returns → correlation matrix.

use crate::correlation::{CorrelationMatrix, correlate};
use crate::error::{AnalysisError, Result};
use crate::price::PriceHistory;
use crate::returns::{ReturnKind, compute_returns};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Return definition (default: log)
    pub return_kind: ReturnKind,
}

impl AnalysisConfig {
    /// Create a configuration for the given return kind.
    pub const fn new(return_kind: ReturnKind) -> Self {
        Self { return_kind }
    }
}

/// Result of a single analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationAnalysis {
    /// Correlation matrix and observation counts.
    pub matrix: CorrelationMatrix,
    /// Return definition used.
    pub return_kind: ReturnKind,
    /// Requested tickers with no usable price series.
    pub dropped: Vec<String>,
}

/// Run a correlation analysis over the requested tickers.
///
/// Tickers that are absent from `history` or have fewer than two prices are
/// left out of the matrix and listed in [`CorrelationAnalysis::dropped`].
///
/// # Errors
/// Returns [`AnalysisError::InvalidTickerList`] if `tickers` is empty or
/// names the same ticker twice.
pub fn analyze<S: AsRef<str>>(
    history: &PriceHistory,
    tickers: &[S],
    config: &AnalysisConfig,
) -> Result<CorrelationAnalysis> {
    validate_tickers(tickers)?;

    let (selected, mut dropped) = history.select(tickers);
    let returns = compute_returns(&selected, config.return_kind);

    dropped.extend(
        selected
            .tickers()
            .filter(|t| returns.get(t).is_none())
            .map(str::to_string),
    );
    if !dropped.is_empty() {
        debug!(?dropped, "tickers without enough price data");
    }

    let matrix = correlate(&returns);
    info!(
        tickers = matrix.len(),
        undefined_pairs = matrix.undefined_pairs(),
        return_kind = %config.return_kind,
        "correlation matrix computed"
    );

    Ok(CorrelationAnalysis {
        matrix,
        return_kind: config.return_kind,
        dropped,
    })
}

fn validate_tickers<S: AsRef<str>>(tickers: &[S]) -> Result<()> {
    if tickers.is_empty() {
        return Err(AnalysisError::InvalidTickerList(
            "at least one ticker is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(tickers.len());
    for ticker in tickers {
        let ticker = ticker.as_ref();
        if ticker.trim().is_empty() {
            return Err(AnalysisError::InvalidTickerList(
                "ticker symbols must not be blank".to_string(),
            ));
        }
        if !seen.insert(ticker) {
            return Err(AnalysisError::InvalidTickerList(format!(
                "duplicate ticker: {ticker}"
            )));
        }
    }

    Ok(())
}
