//! End-to-end request tests against an in-memory close source.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use correlheat::analysis::{PricePoint, ReturnKind};
use correlheat::data::{CloseSource, DataError, DateRange, FetchConfig, PriceCache};
use correlheat::{AnalysisRequest, Basket, Error, run_request, run_request_with_cache};
use std::cell::Cell;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct MemorySource {
    closes: HashMap<String, Vec<PricePoint>>,
    calls: Cell<usize>,
}

impl MemorySource {
    fn with(mut self, symbol: &str, prices: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
            .collect();
        self.closes.insert(symbol.to_string(), points);
        self
    }
}

impl CloseSource for MemorySource {
    async fn fetch_closes(
        &self,
        symbol: &str,
        _range: DateRange,
    ) -> correlheat::data::Result<Vec<PricePoint>> {
        self.calls.set(self.calls.get() + 1);
        self.closes
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "not listed".to_string(),
            })
    }
}

fn request(raw: &str, kind: ReturnKind) -> AnalysisRequest {
    AnalysisRequest::resolve(
        Basket::parse(raw).unwrap(),
        None,
        None,
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        kind,
        &FetchConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_request_produces_matrix() {
    let source = MemorySource::default()
        .with("AAPL", &[190.0, 192.0, 191.0, 195.0, 194.0])
        .with("MSFT", &[420.0, 424.0, 422.0, 430.0, 428.0])
        .with("INVERSE", &[1.0 / 190.0, 1.0 / 192.0, 1.0 / 191.0, 1.0 / 195.0, 1.0 / 194.0]);
    let mut seen = Vec::new();

    let analysis = run_request(
        &source,
        &request("aapl, msft inverse", ReturnKind::Log),
        |s| seen.push(s.to_string()),
    )
    .await
    .unwrap();

    let matrix = &analysis.matrix;
    assert_eq!(matrix.tickers(), ["AAPL", "INVERSE", "MSFT"]);
    assert_relative_eq!(matrix.get("AAPL", "INVERSE").unwrap(), -1.0, epsilon = 1e-12);
    assert!(matrix.get("AAPL", "MSFT").unwrap() > 0.9);
    assert_eq!(matrix.observations_between("AAPL", "MSFT"), Some(4));
    assert_eq!(seen, vec!["AAPL", "MSFT", "INVERSE"]);
    assert!(analysis.dropped.is_empty());
}

#[tokio::test]
async fn test_unknown_symbols_are_dropped() {
    let source = MemorySource::default()
        .with("AAPL", &[190.0, 192.0, 191.0])
        .with("MSFT", &[420.0, 424.0, 422.0]);

    let analysis = run_request(&source, &request("AAPL MSFT NOPE", ReturnKind::Percentage), |_| {})
        .await
        .unwrap();

    assert_eq!(analysis.matrix.len(), 2);
    assert_eq!(analysis.dropped, vec!["NOPE"]);
    assert_eq!(analysis.return_kind, ReturnKind::Percentage);
}

#[tokio::test]
async fn test_each_request_fetches_afresh() {
    let source = MemorySource::default()
        .with("AAPL", &[190.0, 192.0, 191.0])
        .with("MSFT", &[420.0, 424.0, 422.0]);
    let req = request("AAPL MSFT", ReturnKind::Log);

    run_request(&source, &req, |_| {}).await.unwrap();
    run_request(&source, &req, |_| {}).await.unwrap();

    assert_eq!(source.calls.get(), 4);
}

#[tokio::test]
async fn test_shared_cache_skips_refetch() {
    let source = MemorySource::default()
        .with("AAPL", &[190.0, 192.0, 191.0])
        .with("MSFT", &[420.0, 424.0, 422.0]);
    let mut cache = PriceCache::new();

    let first = run_request_with_cache(
        &source,
        &mut cache,
        &request("AAPL MSFT", ReturnKind::Log),
        |_| {},
    )
    .await
    .unwrap();
    let second = run_request_with_cache(
        &source,
        &mut cache,
        &request("AAPL MSFT", ReturnKind::Percentage),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(source.calls.get(), 2);
    assert_eq!(cache.stats().hits, 2);
    assert_eq!(first.matrix.tickers(), second.matrix.tickers());
    assert_eq!(second.return_kind, ReturnKind::Percentage);
}

#[tokio::test]
async fn test_no_data_is_an_error() {
    let source = MemorySource::default();

    let result = run_request(&source, &request("AAA BBB", ReturnKind::Log), |_| {}).await;
    assert!(matches!(
        result,
        Err(Error::Data(DataError::MissingData { .. }))
    ));
}
