//! Pattern extraction and adjacency analysis for the overlapping model
//!
//! Slides an `S×S` window across the exemplar, histograms the windows (and
//! their requested symmetry images), and derives pattern adjacency from
//! overlap agreement under the sampling stride.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::algorithm::wave::CompatibilityTable;
use crate::analysis::catalog::PatternCatalog;
use crate::io::error::Result;
use crate::spatial::direction::ByDirection;
use crate::spatial::grid::{overlap_equal_when_offset, window, SquareGrid};
use crate::spatial::symmetry::SymmetrySet;
use crate::spatial::wrapping::Wrapping;

/// Histogram every window of the exemplar into a pattern catalog
///
/// Windows are taken at every origin that fits (every origin at all when the
/// axis wraps). Each requested symmetry image counts as its own occurrence.
/// In equal-frequency mode every distinct window ends up with count 1.
///
/// # Errors
///
/// Returns an error if the exemplar yields no windows, e.g. when it is
/// smaller than the pattern size and does not wrap.
pub fn gather_patterns<C: Copy + Ord>(
    exemplar: &Array2<C>,
    pattern_size: usize,
    input_wrapping: Wrapping,
    symmetries: SymmetrySet,
    equal_frequencies: bool,
) -> Result<PatternCatalog<C>> {
    let (width, height) = exemplar.dim();

    let x_end = if input_wrapping.horizontal() {
        width as i32
    } else {
        width as i32 - pattern_size as i32 + 1
    };
    let y_end = if input_wrapping.vertical() {
        height as i32
    } else {
        height as i32 - pattern_size as i32 + 1
    };

    let mut histogram: BTreeMap<SquareGrid<C>, f64> = BTreeMap::new();

    for x in 0..x_end {
        for y in 0..y_end {
            let base = window(exemplar, (x, y), pattern_size, input_wrapping);
            for image in base.symmetry_images(symmetries) {
                if equal_frequencies {
                    histogram.insert(image, 1.0);
                } else {
                    *histogram.entry(image).or_insert(0.0) += 1.0;
                }
            }
        }
    }

    PatternCatalog::from_histogram(histogram)
}

/// Derive the adjacency table from pairwise overlap agreement
///
/// Pattern `j` may lie in direction `d` of pattern `i` when the two windows
/// agree everywhere they overlap once `j` is shifted one stride step along
/// `d`. Iterating candidate ids in ascending order keeps each adjacency list
/// sorted.
pub fn compatibilities<C: PartialEq>(
    patterns: &[SquareGrid<C>],
    stride: (usize, usize),
) -> CompatibilityTable {
    let count = patterns.len();

    (0..count)
        .map(|i| {
            ByDirection::from_fn(|dir| {
                let (dx, dy) = dir.offset();
                let offset = (dx * stride.0 as i32, dy * stride.1 as i32);
                (0..count)
                    .filter(|&j| overlap_equal_when_offset(&patterns[i], &patterns[j], offset))
                    .collect()
            })
        })
        .collect()
}
