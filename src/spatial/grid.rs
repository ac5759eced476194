//! Square pattern windows and exemplar grid access
//!
//! Full-size grids are `ndarray::Array2` with dimension `(width, height)`
//! and `[x, y]` indexing. Patterns and tile images are small square windows
//! with their own storage so they can be ordered, compared, and transformed.

use ndarray::Array2;

use crate::spatial::symmetry::{Symmetry, SymmetrySet};
use crate::spatial::wrapping::Wrapping;

/// A square block of cell values, the payload of one pattern
///
/// Stored column-major: `cells[x * side + y]`. Ordering and equality compare
/// side length first, then cell content, which makes pattern ids
/// deterministic when windows are deduplicated through an ordered map.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SquareGrid<T> {
    side: usize,
    cells: Vec<T>,
}

impl<T> SquareGrid<T> {
    /// Side length of the square
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Cell value at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.cells[x * self.side + y]
    }
}

impl<T: Clone> SquareGrid<T> {
    /// A grid with every cell set to `value`
    pub fn filled(side: usize, value: T) -> Self {
        Self {
            side,
            cells: vec![value; side * side],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell
    pub fn from_fn(side: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(side * side);
        for x in 0..side {
            for y in 0..side {
                cells.push(f(x, y));
            }
        }
        Self { side, cells }
    }

    /// The image of the grid under one symmetry of the square
    pub fn transformed(&self, symmetry: Symmetry) -> Self {
        let n = self.side;
        let source: fn((usize, usize), usize) -> (usize, usize) = match symmetry {
            Symmetry::Rotation0 => |(x, y), _| (x, y),
            Symmetry::Rotation90 => |(x, y), n| (n - y - 1, x),
            Symmetry::Rotation180 => |(x, y), n| (n - x - 1, n - y - 1),
            Symmetry::Rotation270 => |(x, y), n| (y, n - x - 1),
            Symmetry::FlipHorizontal => |(x, y), n| (x, n - y - 1),
            Symmetry::FlipVertical => |(x, y), n| (n - x - 1, y),
            Symmetry::FlipMainDiagonal => |(x, y), _| (y, x),
            Symmetry::FlipAntiDiagonal => |(x, y), n| (n - y - 1, n - x - 1),
        };
        Self::from_fn(n, |x, y| {
            let (sx, sy) = source((x, y), n);
            self.get(sx, sy).clone()
        })
    }

    /// The identity image followed by every image requested in `set`
    pub fn symmetry_images(&self, set: SymmetrySet) -> Vec<Self> {
        let mut images = Vec::with_capacity(1 + set.len());
        images.push(self.clone());
        for symmetry in set.iter() {
            images.push(self.transformed(symmetry));
        }
        images
    }
}

/// Extract a square window from a grid, wrapping on the requested axes
///
/// On non-wrapped axes the caller keeps `top_left` far enough from the edge
/// for the whole window to fit.
pub fn window<T: Clone>(
    source: &Array2<T>,
    top_left: (i32, i32),
    side: usize,
    wrap: Wrapping,
) -> SquareGrid<T> {
    let (width, height) = source.dim();
    SquareGrid::from_fn(side, |xx, yy| {
        let mut x = top_left.0 + xx as i32;
        let mut y = top_left.1 + yy as i32;
        if wrap.horizontal() {
            x = x.rem_euclid(width as i32);
        }
        if wrap.vertical() {
            y = y.rem_euclid(height as i32);
        }
        source[[x as usize, y as usize]].clone()
    })
}

/// Whether `lhs` and `rhs` agree on their overlap when `rhs` is translated
/// by `offset`
///
/// An empty overlap is trivially equal.
pub fn overlap_equal_when_offset<T: PartialEq>(
    lhs: &SquareGrid<T>,
    rhs: &SquareGrid<T>,
    offset: (i32, i32),
) -> bool {
    let (dx, dy) = offset;
    let lhs_side = lhs.side() as i32;
    let rhs_side = rhs.side() as i32;

    // intersection in lhs coordinates
    let x_begin = 0.max(dx);
    let x_end = lhs_side.min(rhs_side + dx);
    let y_begin = 0.max(dy);
    let y_end = lhs_side.min(rhs_side + dy);

    for x in x_begin..x_end {
        for y in y_begin..y_end {
            if lhs.get(x as usize, y as usize) != rhs.get((x - dx) as usize, (y - dy) as usize) {
                return false;
            }
        }
    }

    true
}
