//! Second-order response surface modelling in two coded factors.
//!
//! ## Overview
//!
//! The full quadratic model
//!
//! ```text
//! y = b0 + b1·x1 + b2·x2 + b11·x1² + b22·x2² + b12·x1·x2
//! ```
//!
//! is fitted by ordinary least squares through the 6×6 normal equations
//! XᵀX·b = Xᵀy, solved with Gaussian elimination and partial pivoting.
//! The fitted surface can then be searched for its stationary point,
//! classified by the signs of the Hessian eigenvalues.

use ndarray::{Array1, Array2};
use tracing::debug;

use super::types::{RsmCoefficients, RsmModel, StationaryKind, StationaryPoint};
use crate::design::DesignMatrix;
use crate::error::{Error, Result};

/// Number of coefficients in the two-factor quadratic model.
pub const RSM_TERMS: usize = 6;

/// Pivot and determinant magnitude treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
fn solve_linear_system(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[[i, col]]
                    .abs()
                    .partial_cmp(&a[[j, col]].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[[pivot_row, col]].abs() < SINGULAR_TOLERANCE * scale {
            return Err(Error::degenerate(
                "normal equations are singular; the design cannot support a full quadratic model",
            ));
        }

        if pivot_row != col {
            for j in 0..n {
                a.swap([col, j], [pivot_row, j]);
            }
            b.swap(col, pivot_row);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[[row, j]] -= factor * a[[col, j]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|j| a[[row, j]] * x[j]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

/// Fit a full second-order model of `response` on exactly two factors.
///
/// # Errors
///
/// - `UnsupportedFactorCount` unless exactly two factors are given
/// - `UnknownFactor` / `UnknownResponse` for names not in the design
/// - `InsufficientData` with fewer than 6 runs
/// - `DegenerateModel` if the normal equations are singular (for example a
///   two-level factorial with only center points added)
///
/// # Example
///
/// ```
/// use doe_sqc::design::{central_composite, CcdConfig};
/// use doe_sqc::doe::fit_second_order;
///
/// let ccd = central_composite(2, &CcdConfig::default()).unwrap();
/// let y: Vec<f64> = ccd
///     .design
///     .data()
///     .rows()
///     .into_iter()
///     .map(|r| 80.0 - 2.0 * r[0] * r[0] - 3.0 * r[1] * r[1])
///     .collect();
/// let design = ccd.design.with_response("Y", y).unwrap();
///
/// let model = fit_second_order(&design, &["X1", "X2"], "Y").unwrap();
/// assert!((model.coefficients.b0 - 80.0).abs() < 1e-8);
/// assert!((model.coefficients.b22 + 3.0).abs() < 1e-8);
/// ```
pub fn fit_second_order(
    design: &DesignMatrix,
    factors: &[&str],
    response: &str,
) -> Result<RsmModel> {
    let [f1, f2] = factors else {
        return Err(Error::UnsupportedFactorCount {
            expected: 2,
            actual: factors.len(),
        });
    };

    let x1 = design.column(f1)?;
    let x2 = design.column(f2)?;
    let y = design.response(response)?;
    let n = design.runs();
    if n < RSM_TERMS {
        return Err(Error::insufficient("second-order model fit", RSM_TERMS, n));
    }

    // Model matrix columns: 1, x1, x2, x1², x2², x1·x2
    let x = Array2::from_shape_fn((n, RSM_TERMS), |(i, j)| {
        let (a, b) = (x1[i], x2[i]);
        match j {
            0 => 1.0,
            1 => a,
            2 => b,
            3 => a * a,
            4 => b * b,
            _ => a * b,
        }
    });
    let y_vec = Array1::from(y.to_vec());

    let xtx = x.t().dot(&x);
    let xty = x.t().dot(&y_vec);
    let b = solve_linear_system(xtx, xty)?;
    if b.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteResult {
            statistic: "regression coefficient",
        });
    }

    let coefficients = RsmCoefficients {
        b0: b[0],
        b1: b[1],
        b2: b[2],
        b11: b[3],
        b22: b[4],
        b12: b[5],
    };

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let ss_total: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let ss_error: f64 = (0..n)
        .map(|i| (y[i] - predict(&coefficients, x1[i], x2[i])).powi(2))
        .sum();
    let r_squared = if ss_total > 0.0 {
        (1.0 - ss_error / ss_total).clamp(0.0, 1.0)
    } else {
        1.0
    };

    debug!(runs = n, r_squared, "fitted second-order model");

    Ok(RsmModel {
        equation: coefficients.equation(f1, f2),
        coefficients,
        factors: [(*f1).to_string(), (*f2).to_string()],
        r_squared,
        runs: n,
    })
}

/// Evaluate the quadratic model at coded settings `(x1, x2)`.
///
/// At the origin this returns `b0` exactly.
#[must_use]
pub fn predict(coefficients: &RsmCoefficients, x1: f64, x2: f64) -> f64 {
    let c = coefficients;
    c.b0 + c.b1 * x1 + c.b2 * x2 + c.b11 * x1 * x1 + c.b22 * x2 * x2 + c.b12 * x1 * x2
}

/// Classify the Hessian `[[2·b11, b12], [b12, 2·b22]]`.
///
/// Returns `Degenerate` when the determinant is within tolerance of zero.
#[must_use]
pub fn classify_hessian(coefficients: &RsmCoefficients) -> StationaryKind {
    let c = coefficients;
    let det = 4.0 * c.b11 * c.b22 - c.b12 * c.b12;
    let trace = 2.0 * (c.b11 + c.b22);

    if det.abs() < SINGULAR_TOLERANCE {
        StationaryKind::Degenerate
    } else if det < 0.0 {
        StationaryKind::Saddle
    } else if trace < 0.0 {
        StationaryKind::Maximum
    } else {
        StationaryKind::Minimum
    }
}

/// Eigenvalues of the symmetric quadratic-form matrix
/// `[[b11, b12/2], [b12/2, b22]]`, in ascending order.
///
/// These are the coefficients of the canonical form of the surface.
#[must_use]
pub fn canonical_eigenvalues(coefficients: &RsmCoefficients) -> (f64, f64) {
    let c = coefficients;
    let mid = (c.b11 + c.b22) / 2.0;
    let radius = (((c.b11 - c.b22) / 2.0).powi(2) + (c.b12 / 2.0).powi(2)).sqrt();
    (mid - radius, mid + radius)
}

/// Locate and classify the stationary point of the fitted surface.
///
/// Solves ∂y/∂x1 = ∂y/∂x2 = 0 in closed form. With
/// D = 4·b11·b22 − b12²:
///
/// ```text
/// x1* = −(2·b22·b1 − b12·b2) / D
/// x2* = −(2·b11·b2 − b12·b1) / D
/// ```
///
/// # Errors
///
/// Returns `DegenerateModel` when |D| < 1e-12 (no unique stationary point).
pub fn find_stationary_point(coefficients: &RsmCoefficients) -> Result<StationaryPoint> {
    let c = coefficients;
    let det = 4.0 * c.b11 * c.b22 - c.b12 * c.b12;
    if det.abs() < SINGULAR_TOLERANCE {
        return Err(Error::degenerate(
            "Hessian is singular; the surface has no unique stationary point",
        ));
    }

    let x1 = -(2.0 * c.b22 * c.b1 - c.b12 * c.b2) / det;
    let x2 = -(2.0 * c.b11 * c.b2 - c.b12 * c.b1) / det;

    Ok(StationaryPoint {
        x1,
        x2,
        predicted: predict(c, x1, x2),
        kind: classify_hessian(c),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{central_composite, full_factorial, CcdConfig, CcdType};

    fn surface(x1: f64, x2: f64) -> f64 {
        50.0 + 2.0 * x1 - 1.5 * x2 - 3.0 * x1 * x1 - 2.0 * x2 * x2 + 0.5 * x1 * x2
    }

    fn ccd_with(ccd_type: CcdType, f: impl Fn(f64, f64) -> f64) -> DesignMatrix {
        let config = CcdConfig {
            ccd_type,
            ..Default::default()
        };
        let ccd = central_composite(2, &config).unwrap();
        let y = ccd
            .design
            .data()
            .rows()
            .into_iter()
            .map(|r| f(r[0], r[1]))
            .collect();
        ccd.design.with_response("Y", y).unwrap()
    }

    #[test]
    fn test_fit_recovers_exact_surface() {
        for ccd_type in [CcdType::Circumscribed, CcdType::Faced, CcdType::Inscribed] {
            let design = ccd_with(ccd_type, surface);
            let model = fit_second_order(&design, &["X1", "X2"], "Y").unwrap();
            let c = model.coefficients;
            assert!((c.b0 - 50.0).abs() < 1e-8);
            assert!((c.b1 - 2.0).abs() < 1e-8);
            assert!((c.b2 + 1.5).abs() < 1e-8);
            assert!((c.b11 + 3.0).abs() < 1e-8);
            assert!((c.b22 + 2.0).abs() < 1e-8);
            assert!((c.b12 - 0.5).abs() < 1e-8);
            assert!((model.r_squared - 1.0).abs() < 1e-9);
            assert_eq!(model.runs, 11);
            assert!(model.equation.starts_with("y = 50.0000 + 2.0000·X1"));
        }
    }

    #[test]
    fn test_predict_at_origin_is_intercept() {
        let c = RsmCoefficients {
            b0: 12.345,
            b1: -3.0,
            b2: 7.0,
            b11: -1.0,
            b22: 2.0,
            b12: -0.25,
        };
        assert_eq!(predict(&c, 0.0, 0.0), 12.345);
    }

    #[test]
    fn test_stationary_maximum() {
        let c = RsmCoefficients {
            b0: 50.0,
            b1: 2.0,
            b2: -1.5,
            b11: -3.0,
            b22: -2.0,
            b12: 0.5,
        };
        let sp = find_stationary_point(&c).unwrap();
        assert_eq!(sp.kind, StationaryKind::Maximum);

        // Gradient vanishes at the stationary point
        let g1 = c.b1 + 2.0 * c.b11 * sp.x1 + c.b12 * sp.x2;
        let g2 = c.b2 + 2.0 * c.b22 * sp.x2 + c.b12 * sp.x1;
        assert!(g1.abs() < 1e-10);
        assert!(g2.abs() < 1e-10);

        // A maximum beats nearby points
        for (dx, dy) in [(0.1, 0.0), (0.0, 0.1), (-0.1, -0.1)] {
            assert!(sp.predicted > predict(&c, sp.x1 + dx, sp.x2 + dy));
        }
    }

    #[test]
    fn test_stationary_minimum_and_saddle() {
        let bowl = RsmCoefficients {
            b11: 1.0,
            b22: 2.0,
            ..Default::default()
        };
        let sp = find_stationary_point(&bowl).unwrap();
        assert_eq!(sp.kind, StationaryKind::Minimum);
        assert!(sp.x1.abs() < 1e-12 && sp.x2.abs() < 1e-12);

        let saddle = RsmCoefficients {
            b1: 1.0,
            b11: 1.0,
            b22: -1.0,
            ..Default::default()
        };
        let sp = find_stationary_point(&saddle).unwrap();
        assert_eq!(sp.kind, StationaryKind::Saddle);
        assert!((sp.x1 + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pure_quadratic_stationary_points() {
        let cap = RsmCoefficients {
            b11: -2.0,
            b22: -1.0,
            ..Default::default()
        };
        let sp = find_stationary_point(&cap).unwrap();
        assert_eq!(sp.kind, StationaryKind::Maximum);
        assert!(sp.x1.abs() < 1e-12 && sp.x2.abs() < 1e-12);
        assert!(sp.predicted.abs() < 1e-12);

        let saddle = RsmCoefficients {
            b11: 2.0,
            b22: -2.0,
            ..Default::default()
        };
        let sp = find_stationary_point(&saddle).unwrap();
        assert_eq!(sp.kind, StationaryKind::Saddle);
        assert!(sp.x1.abs() < 1e-12 && sp.x2.abs() < 1e-12);
        assert_eq!(classify_hessian(&saddle), StationaryKind::Saddle);
    }

    #[test]
    fn test_degenerate_hessian() {
        // 4·b11·b22 = b12² → ridge
        let ridge = RsmCoefficients {
            b11: 1.0,
            b22: 1.0,
            b12: 2.0,
            ..Default::default()
        };
        assert_eq!(classify_hessian(&ridge), StationaryKind::Degenerate);
        assert!(matches!(
            find_stationary_point(&ridge),
            Err(Error::DegenerateModel { .. })
        ));
    }

    #[test]
    fn test_canonical_eigenvalues() {
        let c = RsmCoefficients {
            b11: -3.0,
            b22: -2.0,
            b12: 0.0,
            ..Default::default()
        };
        let (l1, l2) = canonical_eigenvalues(&c);
        assert!((l1 + 3.0).abs() < 1e-12);
        assert!((l2 + 2.0).abs() < 1e-12);

        let c = RsmCoefficients {
            b11: 1.0,
            b22: 1.0,
            b12: 2.0,
            ..Default::default()
        };
        let (l1, l2) = canonical_eigenvalues(&c);
        assert!(l1.abs() < 1e-12);
        assert!((l2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_errors() {
        let design = ccd_with(CcdType::Faced, surface);
        assert!(matches!(
            fit_second_order(&design, &["X1"], "Y"),
            Err(Error::UnsupportedFactorCount {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            fit_second_order(&design, &["X1", "X2", "X3"], "Y"),
            Err(Error::UnsupportedFactorCount { actual: 3, .. })
        ));

        let small = full_factorial(2, &[])
            .unwrap()
            .with_response("Y", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert!(matches!(
            fit_second_order(&small, &["X1", "X2"], "Y"),
            Err(Error::InsufficientData { .. })
        ));

        // Factorial plus center points: x1² and x2² columns coincide
        let rows = vec![
            vec![-1.0, -1.0],
            vec![1.0, -1.0],
            vec![-1.0, 1.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
        ];
        let y = rows.iter().map(|r| surface(r[0], r[1])).collect();
        let singular = DesignMatrix::from_rows(&["X1", "X2"], &rows)
            .unwrap()
            .with_response("Y", y)
            .unwrap();
        assert!(matches!(
            fit_second_order(&singular, &["X1", "X2"], "Y"),
            Err(Error::DegenerateModel { .. })
        ));
    }
}
