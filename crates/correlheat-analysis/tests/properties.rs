//! Randomised property checks for the analysis pipeline.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use correlheat_analysis::{
    AnalysisConfig, PriceHistory, PricePoint, ReturnKind, analyze, compute_returns,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random walk with occasional missing days.
fn random_walk(rng: &mut StdRng, days: usize, gap_probability: f64) -> Vec<PricePoint> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut price = rng.gen_range(20.0..500.0);
    let mut points = Vec::with_capacity(days);

    for day in 0..days {
        price *= 1.0 + rng.gen_range(-0.04..0.04);
        if rng.gen_bool(gap_probability) {
            continue;
        }
        points.push(PricePoint::new(start + Duration::days(day as i64), price));
    }

    points
}

fn random_history(seed: u64, tickers: &[&str]) -> PriceHistory {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut history = PriceHistory::new();
    for ticker in tickers {
        let days = rng.gen_range(2..120);
        let walk = random_walk(&mut rng, days, 0.15);
        history.insert(*ticker, walk).unwrap();
    }
    history
}

const TICKERS: [&str; 6] = ["AAPL", "MSFT", "GOOGL", "NVDA", "AMZN", "META"];

#[test]
fn test_return_length_is_price_length_minus_one() {
    for seed in 0..20 {
        let history = random_history(seed, &TICKERS);
        for kind in ReturnKind::all() {
            let returns = compute_returns(&history, kind);
            for (ticker, prices) in history.iter() {
                match returns.get(ticker) {
                    Some(series) => assert_eq!(series.len(), prices.len() - 1),
                    None => assert!(prices.len() < 2),
                }
            }
        }
    }
}

#[test]
fn test_matrix_symmetric_bounded_unit_diagonal() {
    for seed in 0..50 {
        let history = random_history(seed, &TICKERS);
        let analysis = analyze(&history, &TICKERS, &AnalysisConfig::default()).unwrap();
        let matrix = &analysis.matrix;
        let n = matrix.len();

        for i in 0..n {
            assert_eq!(matrix.value(i, i), Some(1.0));
            for j in 0..n {
                // Bitwise equality: each pair is computed once and mirrored.
                assert_eq!(
                    matrix.value(i, j).map(f64::to_bits),
                    matrix.value(j, i).map(f64::to_bits)
                );
                assert_eq!(matrix.observations(i, j), matrix.observations(j, i));
                if let Some(v) = matrix.value(i, j) {
                    assert!((-1.0..=1.0).contains(&v), "value {v} out of range");
                }
                if i != j && matrix.observations(i, j) < 2 {
                    assert_eq!(matrix.value(i, j), None);
                }
            }
        }
    }
}

#[test]
fn test_identical_prices_fully_correlated() {
    let mut rng = StdRng::seed_from_u64(7);
    let walk = random_walk(&mut rng, 60, 0.0);
    let history = PriceHistory::new()
        .with_series("AAA", walk.clone())
        .unwrap()
        .with_series("BBB", walk)
        .unwrap();

    for kind in ReturnKind::all() {
        let analysis = analyze(&history, &["AAA", "BBB"], &AnalysisConfig::new(kind)).unwrap();
        assert_relative_eq!(analysis.matrix.get("AAA", "BBB").unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(analysis.matrix.observations_between("AAA", "BBB"), Some(59));
    }
}

#[test]
fn test_reciprocal_prices_anti_correlated_in_log_space() {
    // ln(1/p_t / 1/p_{t-1}) = -ln(p_t / p_{t-1})
    let mut rng = StdRng::seed_from_u64(11);
    let walk = random_walk(&mut rng, 60, 0.0);
    let inverse: Vec<PricePoint> = walk
        .iter()
        .map(|p| PricePoint::new(p.date, 1_000.0 / p.price))
        .collect();
    let history = PriceHistory::new()
        .with_series("AAA", walk)
        .unwrap()
        .with_series("INV", inverse)
        .unwrap();

    let analysis = analyze(&history, &["AAA", "INV"], &AnalysisConfig::default()).unwrap();
    assert_relative_eq!(analysis.matrix.get("AAA", "INV").unwrap(), -1.0, epsilon = 1e-9);
}

#[test]
fn test_constant_price_is_undefined() {
    let mut rng = StdRng::seed_from_u64(3);
    let walk = random_walk(&mut rng, 30, 0.0);
    let flat: Vec<PricePoint> = walk.iter().map(|p| PricePoint::new(p.date, 42.0)).collect();
    let history = PriceHistory::new()
        .with_series("AAA", walk)
        .unwrap()
        .with_series("FLAT", flat)
        .unwrap();

    for kind in ReturnKind::all() {
        let analysis = analyze(&history, &["AAA", "FLAT"], &AnalysisConfig::new(kind)).unwrap();
        assert_eq!(analysis.matrix.get("AAA", "FLAT"), None);
        assert_eq!(analysis.matrix.observations_between("AAA", "FLAT"), Some(29));
        assert_eq!(analysis.matrix.get("FLAT", "FLAT"), Some(1.0));
    }
}

#[test]
fn test_log_and_percentage_returns_differ() {
    let history = random_history(5, &["AAA"]);
    let log = compute_returns(&history, ReturnKind::Log);
    let pct = compute_returns(&history, ReturnKind::Percentage);

    if let (Some(log), Some(pct)) = (log.get("AAA"), pct.get("AAA")) {
        assert!(log.iter().zip(pct).any(|(l, p)| l.value != p.value));
        for (l, p) in log.iter().zip(pct) {
            assert_eq!(l.date, p.date);
            // ln(1 + r) <= r
            assert!(l.value <= p.value);
        }
    }
}
