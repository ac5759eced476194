//! Fast approximate natural logarithm
//!
//! The solver refreshes a cell's entropy after every ban, so the logarithm
//! sits on the hottest path of propagation. The bit-cast approximation below
//! is accurate to roughly three decimal digits over the unit interval, which
//! is plenty for ordering cells by entropy as long as every refreshed value
//! uses the same function.

/// Bit-cast approximation of `ln(a)` for positive finite inputs
pub fn approximate_ln(a: f64) -> f64 {
    let bits = a.to_bits() as i64;
    (bits - 4_606_921_278_410_026_770) as f64 * 1.539_095_918_623_324e-16
}
