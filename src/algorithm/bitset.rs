//! Flat possibility bitmap backing the wave
//!
//! One bit per (cell, pattern) pair, packed into a single vector so the
//! whole wave state clears and resets in bulk.

use bitvec::prelude::*;

/// Per-cell pattern possibility bits for a whole wave
///
/// Cell-major layout: the bits for one cell are contiguous, so scanning a
/// cell's surviving patterns is a short range query.
#[derive(Clone, Debug)]
pub struct PlacementBitset {
    bits: BitVec,
    patterns_per_cell: usize,
}

impl PlacementBitset {
    /// Every pattern allowed at every cell
    pub fn new_all_allowed(cells: usize, patterns_per_cell: usize) -> Self {
        Self {
            bits: bitvec![1; cells * patterns_per_cell],
            patterns_per_cell,
        }
    }

    /// Number of patterns tracked per cell
    pub const fn patterns_per_cell(&self) -> usize {
        self.patterns_per_cell
    }

    /// Whether `pattern` is still possible at `cell`
    pub fn allows(&self, cell: usize, pattern: usize) -> bool {
        self.bits
            .get(cell * self.patterns_per_cell + pattern)
            .as_deref()
            == Some(&true)
    }

    /// Clear one possibility bit, reporting whether it was previously set
    pub fn forbid(&mut self, cell: usize, pattern: usize) -> bool {
        let index = cell * self.patterns_per_cell + pattern;
        let was_allowed = self.bits.get(index).as_deref() == Some(&true);
        if was_allowed {
            self.bits.set(index, false);
        }
        was_allowed
    }

    /// Restore every possibility bit
    pub fn allow_all(&mut self) {
        self.bits.fill(true);
    }

    /// Lowest-numbered pattern still possible at `cell`
    pub fn first_allowed(&self, cell: usize) -> Option<usize> {
        let start = cell * self.patterns_per_cell;
        self.bits[start..start + self.patterns_per_cell].first_one()
    }

    /// Number of patterns still possible at `cell`
    pub fn count_allowed(&self, cell: usize) -> usize {
        let start = cell * self.patterns_per_cell;
        self.bits[start..start + self.patterns_per_cell].count_ones()
    }

    /// Ids of the patterns still possible at `cell`, ascending
    pub fn allowed_at(&self, cell: usize) -> Vec<usize> {
        let start = cell * self.patterns_per_cell;
        self.bits[start..start + self.patterns_per_cell]
            .iter_ones()
            .collect()
    }
}
