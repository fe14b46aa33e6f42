//! Analysis requests: basket + dates + return kind, run end to end.

use crate::basket::Basket;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use correlheat_analysis::{AnalysisConfig, CorrelationAnalysis, ReturnKind, analyze};
use correlheat_data::{CloseSource, DateRange, FetchConfig, PriceCache, load_price_history};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Date format accepted for request ranges.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A fully validated analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Tickers to correlate.
    pub basket: Basket,
    /// Price window, both ends inclusive.
    pub range: DateRange,
    /// Return definition and other analysis settings.
    pub config: AnalysisConfig,
}

impl AnalysisRequest {
    /// Create a request from already-validated parts.
    pub const fn new(basket: Basket, range: DateRange, config: AnalysisConfig) -> Self {
        Self {
            basket,
            range,
            config,
        }
    }

    /// Resolve optional dates against `today`.
    ///
    /// A missing end defaults to `today`; a missing start defaults to
    /// `fetch.lookback_days` before the end.
    ///
    /// # Errors
    /// Returns [`Error::Data`] wrapping `InvalidDateRange` unless the start
    /// falls before the end.
    pub fn resolve(
        basket: Basket,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
        return_kind: ReturnKind,
        fetch: &FetchConfig,
    ) -> Result<Self> {
        let end = end.unwrap_or(today);
        let range = match start {
            Some(start) => DateRange::new(start, end)?,
            None => DateRange::lookback(end, fetch.lookback_days)?,
        };
        Ok(Self::new(basket, range, AnalysisConfig::new(return_kind)))
    }
}

/// Parse a `YYYY-MM-DD` date. `label` names the field in the error.
pub fn parse_date(raw: &str, label: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate {
        label: label.to_string(),
        value: raw.to_string(),
    })
}

/// Load prices for `request` and correlate them.
///
/// A fresh [`PriceCache`] is created for the request and dropped with it,
/// so nothing is shared between requests. Symbols are de-duplicated before
/// loading, so this cache only scopes the request's data and never records
/// a hit; use [`run_request_with_cache`] to share prices across requests.
/// `on_progress` receives each symbol once it has been loaded or skipped.
///
/// # Errors
/// Returns [`Error::Data`] when no prices could be loaded.
pub async fn run_request<S, F>(
    source: &S,
    request: &AnalysisRequest,
    on_progress: F,
) -> Result<CorrelationAnalysis>
where
    S: CloseSource,
    F: FnMut(&str),
{
    let mut cache = PriceCache::new();
    run_request_with_cache(source, &mut cache, request, on_progress).await
}

/// Like [`run_request`], but reads and fills a caller-owned `cache`.
///
/// Prices already cached for the same symbol and range are not fetched
/// again.
///
/// # Errors
/// Returns [`Error::Data`] when no prices could be loaded.
pub async fn run_request_with_cache<S, F>(
    source: &S,
    cache: &mut PriceCache,
    request: &AnalysisRequest,
    on_progress: F,
) -> Result<CorrelationAnalysis>
where
    S: CloseSource,
    F: FnMut(&str),
{
    let history = load_price_history(
        source,
        cache,
        request.basket.tickers(),
        request.range,
        on_progress,
    )
    .await?;

    let analysis = analyze(&history, request.basket.tickers(), &request.config)?;

    let stats = cache.stats();
    info!(
        basket = %request.basket,
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        dropped = analysis.dropped.len(),
        "request complete"
    );
    Ok(analysis)
}
