//! Caller-owned price cache.
//!
//! A [`PriceCache`] lives exactly as long as the caller keeps it: the CLI
//! creates one per analysis request, so a symbol is downloaded at most once
//! per request and nothing leaks between requests.

use crate::loader::DateRange;
use correlheat_analysis::PricePoint;
use std::collections::HashMap;

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful lookups.
    pub hits: usize,
    /// Number of failed lookups.
    pub misses: usize,
    /// Number of cached series.
    pub entries: usize,
}

/// In-memory cache of cleaned daily closes keyed by symbol and date range.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: HashMap<(String, DateRange), Vec<PricePoint>>,
    hits: usize,
    misses: usize,
}

impl PriceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the closes for `symbol` over exactly `range`.
    pub fn get(&mut self, symbol: &str, range: DateRange) -> Option<&[PricePoint]> {
        match self.entries.get(&(symbol.to_string(), range)) {
            Some(points) => {
                self.hits += 1;
                Some(points.as_slice())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the closes for `symbol` over `range`, replacing any previous entry.
    pub fn insert(&mut self, symbol: &str, range: DateRange, points: Vec<PricePoint>) {
        self.entries.insert((symbol.to_string(), range), points);
    }

    /// Whether an entry exists, without touching the counters.
    pub fn contains(&self, symbol: &str, range: DateRange) -> bool {
        self.entries.contains_key(&(symbol.to_string(), range))
    }

    /// Number of cached series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
