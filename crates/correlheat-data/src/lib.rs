#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/correlheat/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod loader;
pub mod yahoo;

pub use cache::{CacheStats, PriceCache};
pub use error::{DataError, Result};
pub use loader::{CloseSource, DateRange, FetchConfig, load_price_history, normalize_tickers};
pub use yahoo::YahooQuoteProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
