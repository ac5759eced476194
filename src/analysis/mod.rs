//! Pattern cataloging and exemplar analysis
//!
//! Turns model inputs into the two immutable tables the solver consumes:
//! the pattern catalog (payloads plus normalized frequencies) and, for the
//! overlapping model, the adjacency table derived from window overlap.

/// Immutable pattern catalogs with normalized frequencies
pub mod catalog;
/// Pattern extraction and adjacency analysis for the overlapping model
pub mod overlap;

pub use catalog::{FrequencySet, PatternCatalog};
