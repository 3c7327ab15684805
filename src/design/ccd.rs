//! Central-composite designs (CCD) for second-order response surfaces.
//!
//! A CCD augments a 2^k factorial with 2k axial (star) points and a number
//! of center points. Three variants are supported:
//!
//! | Variant | Factorial points | Axial points |
//! |---------|------------------|--------------|
//! | Circumscribed (CCC) | ±1 | ±α, α = (2^k)^(1/4) |
//! | Inscribed (CCI) | ±1/α | ±1 |
//! | Faced (CCF) | ±1 | ±1 |
//!
//! The circumscribed variant is rotatable: prediction variance depends only
//! on the distance from the design center.

use ndarray::{s, Array2};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::factorial::factorial_block;
use super::{resolve_names, DesignMatrix, PointType};
use crate::error::{Error, Result};

/// Smallest supported number of factors for a CCD.
pub const MIN_CCD_FACTORS: usize = 2;

/// Largest supported number of factors for a CCD.
pub const MAX_CCD_FACTORS: usize = 8;

/// Placement of the axial points relative to the factorial cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CcdType {
    /// Axial points outside the cube at the rotatable distance.
    #[default]
    Circumscribed,
    /// Cube shrunk so that axial points sit at ±1.
    Inscribed,
    /// Axial points on the cube faces.
    Faced,
}

impl fmt::Display for CcdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Circumscribed => "circumscribed",
            Self::Inscribed => "inscribed",
            Self::Faced => "faced",
        };
        f.write_str(name)
    }
}

impl FromStr for CcdType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circumscribed" | "ccc" => Ok(Self::Circumscribed),
            "inscribed" | "cci" => Ok(Self::Inscribed),
            "faced" | "ccf" => Ok(Self::Faced),
            other => Err(Error::invalid_params(format!(
                "unsupported CCD type '{other}'"
            ))),
        }
    }
}

/// Configuration for central-composite design generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CcdConfig {
    /// Axial placement (default: circumscribed).
    pub ccd_type: CcdType,
    /// Number of center runs (default: 3).
    pub center_points: usize,
    /// Factor names; empty means `X1..Xk` (default: empty).
    pub factor_names: Vec<String>,
}

impl Default for CcdConfig {
    fn default() -> Self {
        Self {
            ccd_type: CcdType::Circumscribed,
            center_points: 3,
            factor_names: Vec::new(),
        }
    }
}

/// A generated central-composite design with its run-count breakdown.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CentralComposite {
    /// The design matrix (factorial block, then axial, then center runs).
    pub design: DesignMatrix,
    /// Coded distance of the axial points from the center.
    pub alpha: f64,
    /// Number of factorial runs (2^k).
    pub num_factorial: usize,
    /// Number of axial runs (2k).
    pub num_axial: usize,
    /// Number of center runs.
    pub num_center: usize,
    /// Total number of runs.
    pub total_runs: usize,
}

/// Rotatable axial distance α = (2^k)^(1/4).
#[must_use]
pub fn rotatable_alpha(k: usize) -> f64 {
    let exponent = i32::try_from(k).unwrap_or(i32::MAX);
    2.0_f64.powi(exponent).powf(0.25)
}

/// Generate a central-composite design.
///
/// # Errors
///
/// - `InvalidFactorCount` if `k` is outside `2..=8`
/// - `FactorNameMismatch` if names are supplied and their count differs from `k`
///
/// # Example
///
/// ```
/// use doe_sqc::design::{central_composite, CcdConfig};
///
/// let ccd = central_composite(2, &CcdConfig::default()).unwrap();
/// assert_eq!(ccd.total_runs, 11); // 4 factorial + 4 axial + 3 center
/// assert!((ccd.alpha - 1.414_21).abs() < 1e-5);
/// ```
pub fn central_composite(k: usize, config: &CcdConfig) -> Result<CentralComposite> {
    if !(MIN_CCD_FACTORS..=MAX_CCD_FACTORS).contains(&k) {
        return Err(Error::InvalidFactorCount {
            k,
            min: MIN_CCD_FACTORS,
            max: MAX_CCD_FACTORS,
        });
    }
    let names = resolve_names(k, &config.factor_names)?;

    let rotatable = rotatable_alpha(k);
    let (cube, alpha) = match config.ccd_type {
        CcdType::Circumscribed => (1.0, rotatable),
        CcdType::Faced => (1.0, 1.0),
        CcdType::Inscribed => (1.0 / rotatable, 1.0),
    };

    let num_factorial = 1usize << k;
    let num_axial = 2 * k;
    let num_center = config.center_points;
    let total_runs = num_factorial + num_axial + num_center;

    let mut data = Array2::<f64>::zeros((total_runs, k));
    data.slice_mut(s![..num_factorial, ..])
        .assign(&(factorial_block(k) * cube));

    for j in 0..k {
        let row = num_factorial + 2 * j;
        data[[row, j]] = -alpha;
        data[[row + 1, j]] = alpha;
    }
    // Center rows are already zero.

    let mut point_types = Vec::with_capacity(total_runs);
    point_types.extend(std::iter::repeat(PointType::Factorial).take(num_factorial));
    point_types.extend(std::iter::repeat(PointType::Axial).take(num_axial));
    point_types.extend(std::iter::repeat(PointType::Center).take(num_center));

    debug!(
        factors = k,
        ccd_type = %config.ccd_type,
        alpha,
        total_runs,
        "generated central composite design"
    );

    let design = DesignMatrix::with_point_types(names, data, point_types)?;
    Ok(CentralComposite {
        design,
        alpha,
        num_factorial,
        num_axial,
        num_center,
        total_runs,
    })
}
