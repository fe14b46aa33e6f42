//! Pairwise Pearson correlation with date alignment
//!
//! Each pair of return series is aligned on the dates both contain (series
//! may have gaps, so alignment is by date, never by position). The Pearson
//! coefficient over the aligned values is
//!
//! ρ(x, y) = Σ(x - x̄)(y - ȳ) / sqrt(Σ(x - x̄)² · Σ(y - ȳ)²)
//!
//! which equals the sample covariance over the product of sample standard
//! deviations. A pair is undefined when it shares fewer than
//! [`MIN_OVERLAP`] dates or either side has zero variance over the overlap.

use crate::colour::{Rgb, correlation_colour};
use crate::returns::{ReturnPoint, ReturnSeries};
use ndarray::Array2;
use std::cmp::Ordering;
use tracing::debug;

/// Minimum number of shared dates for a defined correlation.
pub const MIN_OVERLAP: usize = 2;

/// Relative threshold below which a series' variance counts as zero.
///
/// Compared against Σ(x - x̄)² / Σx², so constant returns that pick up
/// rounding noise in the mean are still treated as constant.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-24;

/// Symmetric correlation matrix with per-pair observation counts.
///
/// Undefined pairs are stored as NaN in [`values`](Self::values) and are
/// reported as `None` by the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Array2<f64>,
    observations: Array2<usize>,
}

impl CorrelationMatrix {
    /// Tickers labelling rows and columns, in matrix order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Position of a ticker in the matrix.
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Correlation at `(row, col)`, `None` if undefined.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        let value = self.values[[row, col]];
        (!value.is_nan()).then_some(value)
    }

    /// Number of overlapping return observations used for `(row, col)`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn observations(&self, row: usize, col: usize) -> usize {
        self.observations[[row, col]]
    }

    /// Correlation between two tickers by name.
    ///
    /// Returns `None` if either ticker is unknown or the pair is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        self.value(i, j)
    }

    /// Observation count between two tickers by name.
    pub fn observations_between(&self, a: &str, b: &str) -> Option<usize> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        Some(self.observations(i, j))
    }

    /// Raw correlation values; NaN marks undefined pairs.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Raw observation-count matrix.
    pub const fn observation_counts(&self) -> &Array2<usize> {
        &self.observations
    }

    /// Display colour for `(row, col)`.
    pub fn colour(&self, row: usize, col: usize) -> Rgb {
        correlation_colour(self.value(row, col))
    }

    /// Display colours for every cell.
    pub fn colours(&self) -> Array2<Rgb> {
        Array2::from_shape_fn(self.values.dim(), |(i, j)| self.colour(i, j))
    }

    /// Smallest and largest off-diagonal observation count.
    ///
    /// `None` when the matrix has fewer than two tickers.
    pub fn overlap_range(&self) -> Option<(usize, usize)> {
        let n = self.len();
        let mut counts = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| self.observations[[i, j]]);

        let first = counts.next()?;
        Some(counts.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))))
    }

    /// Number of off-diagonal pairs that are undefined.
    pub fn undefined_pairs(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.values[[i, j]].is_nan())
            .count()
    }
}

/// Compute the correlation matrix for every ticker in `returns`.
///
/// Rows and columns follow the (sorted) ticker order of `returns`. Each
/// unordered pair is computed once and written to both `(i, j)` and
/// `(j, i)`, so the result is exactly symmetric.
pub fn correlate(returns: &ReturnSeries) -> CorrelationMatrix {
    let entries: Vec<(&str, &[ReturnPoint])> = returns.iter().collect();
    let n = entries.len();

    let mut values = Array2::<f64>::from_elem((n, n), f64::NAN);
    let mut observations = Array2::<usize>::zeros((n, n));

    for i in 0..n {
        let (ticker_i, series_i) = entries[i];
        values[[i, i]] = 1.0;
        observations[[i, i]] = series_i.len();

        for j in (i + 1)..n {
            let (ticker_j, series_j) = entries[j];
            let (xs, ys) = align(series_i, series_j);
            let overlap = xs.len();

            let rho = if overlap < MIN_OVERLAP {
                None
            } else {
                pearson(&xs, &ys)
            };

            if rho.is_none() {
                debug!(a = ticker_i, b = ticker_j, overlap, "correlation undefined");
            }

            let value = rho.unwrap_or(f64::NAN);
            values[[i, j]] = value;
            values[[j, i]] = value;
            observations[[i, j]] = overlap;
            observations[[j, i]] = overlap;
        }
    }

    CorrelationMatrix {
        tickers: entries.iter().map(|(t, _)| (*t).to_string()).collect(),
        values,
        observations,
    }
}

/// Pair up values on the dates both series share.
///
/// Both inputs are date-ordered, so a single merge pass suffices.
fn align(a: &[ReturnPoint], b: &[ReturnPoint]) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::with_capacity(a.len().min(b.len()));
    let mut ys = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                xs.push(a[i].value);
                ys.push(b[j].value);
                i += 1;
                j += 1;
            }
        }
    }

    (xs, ys)
}

/// Pearson coefficient of two equal-length samples, clamped to [-1, 1].
///
/// Returns `None` for fewer than [`MIN_OVERLAP`] points or when either
/// sample has zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n < MIN_OVERLAP {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if is_zero_variance(sxx, xs) || is_zero_variance(syy, ys) {
        return None;
    }

    let rho = sxy / (sxx * syy).sqrt();
    rho.is_finite().then(|| rho.clamp(-1.0, 1.0))
}

fn is_zero_variance(sum_sq_dev: f64, sample: &[f64]) -> bool {
    let sum_sq: f64 = sample.iter().map(|v| v * v).sum();
    sum_sq_dev <= ZERO_VARIANCE_TOLERANCE * sum_sq
}
