//! Numerical utilities for the solver

/// Fast approximate natural logarithm
pub mod approx;
