#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/correlheat/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod colour;
pub mod correlation;
pub mod error;
pub mod price;
pub mod returns;

pub use analysis::{AnalysisConfig, CorrelationAnalysis, analyze};
pub use colour::{LegendStop, Rgb, correlation_colour, legend_stops};
pub use correlation::{CorrelationMatrix, correlate};
pub use error::{AnalysisError, Result};
pub use price::{PriceHistory, PricePoint};
pub use returns::{ReturnKind, ReturnPoint, ReturnSeries, compute_returns, compute_series_returns};
