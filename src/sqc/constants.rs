//! Shewhart control-chart constants.
//!
//! Factors for subgroup sizes 2..=10, 15, 20 and 25 as tabulated in
//! Montgomery, *Introduction to Statistical Quality Control*, Appendix VI.
//! Sizes between tabulated entries are linearly interpolated; sizes outside
//! the table clamp to the nearest end.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Control-chart factors for one subgroup size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartConstants {
    /// X̄ chart factor with R̄: limits X̿ ± A2·R̄.
    pub a2: f64,
    /// X̄ chart factor with S̄: limits X̿ ± A3·S̄.
    pub a3: f64,
    /// S chart lower factor: LCL = B3·S̄.
    pub b3: f64,
    /// S chart upper factor: UCL = B4·S̄.
    pub b4: f64,
    /// R chart lower factor: LCL = D3·R̄.
    pub d3: f64,
    /// R chart upper factor: UCL = D4·R̄.
    pub d4: f64,
    /// Mean of the relative range: σ̂ = R̄/d2.
    pub d2: f64,
    /// Bias correction of S: σ̂ = S̄/c4.
    pub c4: f64,
}

#[allow(clippy::too_many_arguments)]
const fn row(a2: f64, a3: f64, b3: f64, b4: f64, d3: f64, d4: f64, d2: f64, c4: f64) -> ChartConstants {
    ChartConstants {
        a2,
        a3,
        b3,
        b4,
        d3,
        d4,
        d2,
        c4,
    }
}

/// Tabulated subgroup sizes and their constants, ascending by size.
pub const CONSTANTS_TABLE: [(usize, ChartConstants); 12] = [
    (2, row(1.880, 2.659, 0.0, 3.267, 0.0, 3.267, 1.128, 0.7979)),
    (3, row(1.023, 1.954, 0.0, 2.568, 0.0, 2.574, 1.693, 0.8862)),
    (4, row(0.729, 1.628, 0.0, 2.266, 0.0, 2.282, 2.059, 0.9213)),
    (5, row(0.577, 1.427, 0.0, 2.089, 0.0, 2.114, 2.326, 0.9400)),
    (6, row(0.483, 1.287, 0.030, 1.970, 0.0, 2.004, 2.534, 0.9515)),
    (7, row(0.419, 1.182, 0.118, 1.882, 0.076, 1.924, 2.704, 0.9594)),
    (8, row(0.373, 1.099, 0.185, 1.815, 0.136, 1.864, 2.847, 0.9650)),
    (9, row(0.337, 1.032, 0.239, 1.761, 0.184, 1.816, 2.970, 0.9693)),
    (10, row(0.308, 0.975, 0.284, 1.716, 0.223, 1.777, 3.078, 0.9727)),
    (15, row(0.223, 0.789, 0.428, 1.572, 0.347, 1.653, 3.472, 0.9823)),
    (20, row(0.180, 0.680, 0.510, 1.490, 0.415, 1.585, 3.735, 0.9869)),
    (25, row(0.153, 0.606, 0.565, 1.435, 0.459, 1.541, 3.931, 0.9896)),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Constants for subgroup size `n`.
///
/// Tabulated sizes return the table row exactly. Sizes between two
/// tabulated entries are interpolated linearly; sizes below 2 or above 25
/// clamp to the first or last row.
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::get_constants;
///
/// let c = get_constants(5);
/// assert_eq!(c.a2, 0.577);
/// assert_eq!(c.d4, 2.114);
/// assert_eq!(c.d2, 2.326);
/// ```
#[must_use]
pub fn get_constants(n: usize) -> ChartConstants {
    let (first_n, first) = CONSTANTS_TABLE[0];
    let (last_n, last) = CONSTANTS_TABLE[CONSTANTS_TABLE.len() - 1];
    if n <= first_n {
        return first;
    }
    if n >= last_n {
        return last;
    }

    for pair in CONSTANTS_TABLE.windows(2) {
        let (lo_n, lo) = pair[0];
        let (hi_n, hi) = pair[1];
        if n == lo_n {
            return lo;
        }
        if n < hi_n {
            let t = (n - lo_n) as f64 / (hi_n - lo_n) as f64;
            return ChartConstants {
                a2: lerp(lo.a2, hi.a2, t),
                a3: lerp(lo.a3, hi.a3, t),
                b3: lerp(lo.b3, hi.b3, t),
                b4: lerp(lo.b4, hi.b4, t),
                d3: lerp(lo.d3, hi.d3, t),
                d4: lerp(lo.d4, hi.d4, t),
                d2: lerp(lo.d2, hi.d2, t),
                c4: lerp(lo.c4, hi.c4, t),
            };
        }
    }
    last
}
