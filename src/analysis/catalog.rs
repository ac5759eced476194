//! Immutable pattern catalogs with normalized frequencies
//!
//! A catalog pairs the pattern payloads (square windows or tile images) with
//! the numeric weights the solver consumes. The numeric half is kept
//! separate so a wave never needs to know the cell type.

use std::collections::BTreeMap;

use crate::io::error::{GenerationError, Result};
use crate::spatial::grid::SquareGrid;

/// Normalized pattern frequencies with cached `p · ln p` terms
#[derive(Clone, Debug, Default)]
pub struct FrequencySet {
    frequencies: Vec<f64>,
    plogps: Vec<f64>,
}

impl FrequencySet {
    /// Normalize raw counts and precompute the entropy terms
    pub fn from_counts(counts: &[f64]) -> Self {
        let total: f64 = counts.iter().sum();
        let frequencies: Vec<f64> = counts.iter().map(|&count| count / total).collect();
        let plogps = frequencies.iter().map(|&p| p * p.ln()).collect();
        Self {
            frequencies,
            plogps,
        }
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the set holds no patterns
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Normalized frequency of pattern `i`
    pub fn frequency(&self, i: usize) -> f64 {
        self.frequencies[i]
    }

    /// Cached `p[i] · ln p[i]`
    pub fn plogp(&self, i: usize) -> f64 {
        self.plogps[i]
    }

    /// All frequencies, indexed by pattern id
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// All cached entropy terms, indexed by pattern id
    pub fn plogps(&self) -> &[f64] {
        &self.plogps
    }
}

/// Indexed catalog of distinct local patterns
///
/// Built once per model and immutable afterwards. Pattern ids are positions
/// in the element vector.
#[derive(Clone, Debug)]
pub struct PatternCatalog<C> {
    elements: Vec<SquareGrid<C>>,
    weights: FrequencySet,
}

impl<C> PatternCatalog<C> {
    /// Build a catalog from `(payload, raw count)` pairs in the given order
    ///
    /// # Errors
    ///
    /// Returns an error if no entries are supplied.
    pub fn from_entries(entries: Vec<(SquareGrid<C>, f64)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(GenerationError::InvalidSourceData {
                reason: "no patterns to build a catalog from".to_string(),
            });
        }

        let mut elements = Vec::with_capacity(entries.len());
        let mut counts = Vec::with_capacity(entries.len());
        for (element, count) in entries {
            elements.push(element);
            counts.push(count);
        }

        Ok(Self {
            weights: FrequencySet::from_counts(&counts),
            elements,
        })
    }

    /// Build a catalog from a deduplicating histogram
    ///
    /// The ordered map fixes the pattern ids: windows are numbered by their
    /// content ordering, independent of extraction order.
    pub fn from_histogram(histogram: BTreeMap<SquareGrid<C>, f64>) -> Result<Self>
    where
        C: Ord,
    {
        Self::from_entries(histogram.into_iter().collect())
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Payload of pattern `i`
    pub fn element(&self, i: usize) -> &SquareGrid<C> {
        &self.elements[i]
    }

    /// All payloads, indexed by pattern id
    pub fn elements(&self) -> &[SquareGrid<C>] {
        &self.elements
    }

    /// The numeric weights consumed by the solver
    pub const fn weights(&self) -> &FrequencySet {
        &self.weights
    }

    /// Side length of the pattern payloads
    pub fn pattern_side(&self) -> usize {
        self.elements.first().map_or(0, SquareGrid::side)
    }
}
