//! Error types for the analysis core.

use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while preparing or running an analysis.
///
/// Pairs with too little overlap are not errors: they surface as missing
/// cells in the [`CorrelationMatrix`](crate::CorrelationMatrix).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Unsupported return-kind selector
    #[error("Invalid return kind: '{0}' (expected 'log' or 'percentage')")]
    InvalidReturnKind(String),

    /// Empty or duplicated ticker request
    #[error("Invalid ticker list: {0}")]
    InvalidTickerList(String),

    /// Malformed price or return series
    #[error("Invalid series for {ticker}: {reason}")]
    InvalidSeries {
        /// Ticker the series belongs to
        ticker: String,
        /// What was wrong with it
        reason: String,
    },
}
