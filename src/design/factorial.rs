//! Two-level full factorial designs.
//!
//! A 2^k full factorial enumerates every combination of the coded levels
//! {−1, +1} for k factors. Runs are produced in binary counting order with
//! the first factor varying fastest (standard Yates order): in run `r`,
//! factor `j` sits at +1 exactly when bit `j` of `r` is set.

use ndarray::Array2;
use tracing::debug;

use super::{resolve_names, DesignMatrix, PointType};
use crate::error::{Error, Result};

/// Smallest supported number of factors.
pub const MIN_FACTORIAL_FACTORS: usize = 1;

/// Largest supported number of factors (1024 runs).
pub const MAX_FACTORIAL_FACTORS: usize = 10;

/// Coded ±1 corner block of a 2^k factorial in Yates order.
pub(crate) fn factorial_block(k: usize) -> Array2<f64> {
    let runs = 1usize << k;
    Array2::from_shape_fn((runs, k), |(r, j)| if (r >> j) & 1 == 1 { 1.0 } else { -1.0 })
}

/// Generate a 2^k full factorial design.
///
/// Pass an empty slice for `factor_names` to get the default names `X1..Xk`.
///
/// # Errors
///
/// - `InvalidFactorCount` if `k` is outside `1..=10`
/// - `FactorNameMismatch` if names are supplied and their count differs from `k`
///
/// # Example
///
/// ```
/// use doe_sqc::design::full_factorial;
///
/// let design = full_factorial(2, &["Temp", "Time"]).unwrap();
/// assert_eq!(design.runs(), 4);
/// assert_eq!(design.get(1, 0), 1.0);  // Temp high
/// assert_eq!(design.get(1, 1), -1.0); // Time low
/// ```
pub fn full_factorial(k: usize, factor_names: &[&str]) -> Result<DesignMatrix> {
    if !(MIN_FACTORIAL_FACTORS..=MAX_FACTORIAL_FACTORS).contains(&k) {
        return Err(Error::InvalidFactorCount {
            k,
            min: MIN_FACTORIAL_FACTORS,
            max: MAX_FACTORIAL_FACTORS,
        });
    }
    let names = resolve_names(k, factor_names)?;

    let data = factorial_block(k);
    let runs = data.nrows();
    debug!(factors = k, runs, "generated full factorial design");

    DesignMatrix::with_point_types(names, data, vec![PointType::Factorial; runs])
}
