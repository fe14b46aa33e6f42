//! Error types for correlheat requests.

use correlheat_analysis::AnalysisError;
use correlheat_data::DataError;
use thiserror::Error;

/// Errors raised while building or running an analysis request.
#[derive(Debug, Error)]
pub enum Error {
    /// Too few usable tickers in a basket.
    #[error("Enter at least two ticker symbols separated by spaces or commas (got {0})")]
    InvalidBasket(String),

    /// A date string that is not `YYYY-MM-DD`.
    #[error("Invalid {label} date: '{value}'. Use YYYY-MM-DD.")]
    InvalidDate {
        /// Which end of the range was being parsed.
        label: String,
        /// The rejected input.
        value: String,
    },

    /// Price loading failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Correlation analysis failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result type for correlheat requests.
pub type Result<T> = std::result::Result<T, Error>;
