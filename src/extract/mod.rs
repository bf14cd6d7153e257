//! Content extraction with a fixed fallback chain.
//!
//! Each extractor tries its strategies in order - primary selectors,
//! alternate selectors, raw text patterns - and always terminates in
//! deterministic simulation, so a scrape never comes back empty-handed.
//! The strategy that produced the data travels with it.

pub mod posts;
pub mod simulate;
pub mod trends;

use crate::models::ExtractionStrategy;

/// Extraction result paired with the strategy that produced it.
#[derive(Debug)]
pub struct Extracted<T> {
    pub data: T,
    pub strategy: ExtractionStrategy,
}

impl<T> Extracted<T> {
    pub fn new(data: T, strategy: ExtractionStrategy) -> Self {
        Self { data, strategy }
    }

    /// True when every live strategy failed and the data is synthetic.
    pub fn is_simulated(&self) -> bool {
        self.strategy == ExtractionStrategy::Simulated
    }
}
