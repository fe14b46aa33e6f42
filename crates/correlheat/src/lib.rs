#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/correlheat/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod basket;
pub mod error;
pub mod request;

// Re-export main types from sub-crates
pub use correlheat_analysis as analysis;
pub use correlheat_data as data;
pub use correlheat_output as output;

pub use basket::{Basket, DEFAULT_TICKERS, MIN_TICKERS};
pub use error::{Error, Result};
pub use request::{AnalysisRequest, DATE_FORMAT, parse_date, run_request, run_request_with_cache};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
