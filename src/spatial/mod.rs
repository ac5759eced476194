//! Spatial vocabulary shared by the solver and the model adapters
//!
//! This module contains:
//! - Cardinal directions and direction-indexed storage
//! - The D4 symmetry group and flag sets over it
//! - Square pattern windows with transforms and overlap comparison
//! - Toroidal wrapping modes

/// Cardinal directions and direction-indexed storage
pub mod direction;
/// Square pattern windows and exemplar grid access
pub mod grid;
/// The dihedral group D4 and flag sets over it
pub mod symmetry;
/// Toroidal boundary handling
pub mod wrapping;

pub use direction::{ByDirection, Direction};
pub use grid::SquareGrid;
pub use symmetry::{Symmetry, SymmetrySet};
pub use wrapping::Wrapping;
