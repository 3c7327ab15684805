//! Attributes control charts for count and proportion data.
//!
//! - **p chart**: proportion nonconforming, sample size may vary
//! - **np chart**: number nonconforming, constant sample size
//! - **c chart**: defects per inspection unit, constant opportunity
//! - **u chart**: defects per unit, opportunity may vary
//!
//! Charts with a varying sample size carry one set of limits per point.
//! Lower limits never drop below zero and p-chart limits stay within [0, 1].
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 7.

use tracing::debug;

use super::chart::{AttributeChart, ChartType, ControlLimits};
use super::variables::MIN_CHART_POINTS;
use crate::error::{Error, Result};

fn check_length(len: usize, context: &'static str) -> Result<()> {
    if len < MIN_CHART_POINTS {
        return Err(Error::insufficient(context, MIN_CHART_POINTS, len));
    }
    Ok(())
}

fn check_dimensions(defects: usize, sizes: usize) -> Result<()> {
    if defects != sizes {
        return Err(Error::DimensionMismatch {
            expected: format!("{defects} sample sizes"),
            actual: format!("{sizes} sample sizes"),
        });
    }
    Ok(())
}

fn checked_total(counts: &[u64], what: &str) -> Result<u64> {
    counts
        .iter()
        .try_fold(0_u64, |acc, &c| acc.checked_add(c))
        .ok_or_else(|| Error::invalid_params(format!("total of {what} overflows u64")))
}

/// Compute a p chart (fraction nonconforming).
///
/// p̄ = Σdᵢ / Σnᵢ; each sample gets limits p̄ ± 3·√(p̄(1 − p̄)/nᵢ), clamped
/// to [0, 1].
///
/// # Errors
///
/// - `DimensionMismatch` if the two slices differ in length
/// - `InsufficientData` with fewer than 2 samples
/// - `InvalidParams` if a sample size is zero or a count exceeds its sample size
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::p_chart;
///
/// let chart = p_chart(&[5, 8, 3], &[100, 100, 50]).unwrap();
/// assert!((chart.center - 16.0 / 250.0).abs() < 1e-12);
/// // Smaller samples get wider limits
/// assert!(chart.limits[2].ucl > chart.limits[0].ucl);
/// ```
pub fn p_chart(defects: &[u64], sample_sizes: &[u64]) -> Result<AttributeChart> {
    check_dimensions(defects.len(), sample_sizes.len())?;
    check_length(defects.len(), "p chart samples")?;

    for (i, (&d, &n)) in defects.iter().zip(sample_sizes).enumerate() {
        if n == 0 {
            return Err(Error::invalid_params(format!(
                "sample {i} has size zero"
            )));
        }
        if d > n {
            return Err(Error::invalid_params(format!(
                "sample {i} has {d} nonconforming out of {n}"
            )));
        }
    }

    let total_defects = checked_total(defects, "nonconforming counts")?;
    let total_inspected = checked_total(sample_sizes, "sample sizes")?;
    let p_bar = total_defects as f64 / total_inspected as f64;

    let values = defects
        .iter()
        .zip(sample_sizes)
        .map(|(&d, &n)| d as f64 / n as f64)
        .collect();
    let limits = sample_sizes
        .iter()
        .map(|&n| {
            let half_width = 3.0 * (p_bar * (1.0 - p_bar) / n as f64).sqrt();
            ControlLimits {
                ucl: (p_bar + half_width).min(1.0),
                cl: p_bar,
                lcl: (p_bar - half_width).max(0.0),
            }
        })
        .collect();

    debug!(samples = defects.len(), p_bar, "computed p chart limits");

    Ok(AttributeChart {
        chart_type: ChartType::P,
        values,
        center: p_bar,
        limits,
    })
}

/// Compute an np chart (number nonconforming, constant sample size).
///
/// np̄ = mean count; limits np̄ ± 3·√(np̄(1 − p̄)) with the lower limit
/// clamped at 0.
///
/// # Errors
///
/// - `InsufficientData` with fewer than 2 samples
/// - `InvalidParams` if `sample_size` is zero or a count exceeds it
pub fn np_chart(defects: &[u64], sample_size: u64) -> Result<AttributeChart> {
    check_length(defects.len(), "np chart samples")?;
    if sample_size == 0 {
        return Err(Error::invalid_params("sample size must be positive"));
    }
    if let Some(&d) = defects.iter().find(|&&d| d > sample_size) {
        return Err(Error::invalid_params(format!(
            "{d} nonconforming exceeds sample size {sample_size}"
        )));
    }

    let np_bar = checked_total(defects, "nonconforming counts")? as f64 / defects.len() as f64;
    let p_bar = np_bar / sample_size as f64;
    let half_width = 3.0 * (np_bar * (1.0 - p_bar)).sqrt();
    let limits = ControlLimits {
        ucl: np_bar + half_width,
        cl: np_bar,
        lcl: (np_bar - half_width).max(0.0),
    };

    debug!(samples = defects.len(), np_bar, "computed np chart limits");

    Ok(AttributeChart {
        chart_type: ChartType::Np,
        values: defects.iter().map(|&d| d as f64).collect(),
        center: np_bar,
        limits: vec![limits; defects.len()],
    })
}

/// Compute a c chart (defect counts, constant area of opportunity).
///
/// Limits c̄ ± 3·√c̄ with the lower limit clamped at 0.
///
/// # Errors
///
/// Returns `InsufficientData` with fewer than 2 counts.
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::c_chart;
///
/// let chart = c_chart(&[4, 6, 5, 5]).unwrap();
/// assert_eq!(chart.center, 5.0);
/// assert!((chart.limits[0].ucl - (5.0 + 3.0 * 5.0_f64.sqrt())).abs() < 1e-12);
/// assert_eq!(chart.limits[0].lcl, 0.0);
/// ```
pub fn c_chart(counts: &[u64]) -> Result<AttributeChart> {
    check_length(counts.len(), "c chart samples")?;

    let c_bar = checked_total(counts, "defect counts")? as f64 / counts.len() as f64;
    let half_width = 3.0 * c_bar.sqrt();
    let limits = ControlLimits {
        ucl: c_bar + half_width,
        cl: c_bar,
        lcl: (c_bar - half_width).max(0.0),
    };

    debug!(samples = counts.len(), c_bar, "computed c chart limits");

    Ok(AttributeChart {
        chart_type: ChartType::C,
        values: counts.iter().map(|&c| c as f64).collect(),
        center: c_bar,
        limits: vec![limits; counts.len()],
    })
}

/// Compute a u chart (defects per unit, varying opportunity).
///
/// ū = Σcᵢ / Σnᵢ; each sample gets limits ū ± 3·√(ū/nᵢ) with the lower
/// limit clamped at 0.
///
/// # Errors
///
/// - `DimensionMismatch` if the two slices differ in length
/// - `InsufficientData` with fewer than 2 samples
/// - `InvalidParams` if any unit count is not positive and finite
pub fn u_chart(defects: &[u64], units: &[f64]) -> Result<AttributeChart> {
    check_dimensions(defects.len(), units.len())?;
    check_length(defects.len(), "u chart samples")?;
    if let Some(bad) = units.iter().find(|&&u| !(u.is_finite() && u > 0.0)) {
        return Err(Error::invalid_params(format!(
            "units inspected must be positive, got {bad}"
        )));
    }

    let total_units: f64 = units.iter().sum();
    let u_bar = checked_total(defects, "defect counts")? as f64 / total_units;

    let values = defects
        .iter()
        .zip(units)
        .map(|(&d, &n)| d as f64 / n)
        .collect();
    let limits = units
        .iter()
        .map(|&n| {
            let half_width = 3.0 * (u_bar / n).sqrt();
            ControlLimits {
                ucl: u_bar + half_width,
                cl: u_bar,
                lcl: (u_bar - half_width).max(0.0),
            }
        })
        .collect();

    debug!(samples = defects.len(), u_bar, "computed u chart limits");

    Ok(AttributeChart {
        chart_type: ChartType::U,
        values,
        center: u_bar,
        limits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p_chart_limits_narrow_with_sample_size() {
        let chart = p_chart(&[10, 20], &[100, 200]).unwrap();
        assert!((chart.center - 0.1).abs() < 1e-12);
        let small = chart.limits[0];
        let large = chart.limits[1];
        assert!((small.ucl - small.lcl) > (large.ucl - large.lcl));
        assert!((small.ucl - (0.1 + 3.0 * (0.09_f64 / 100.0).sqrt())).abs() < 1e-12);
        assert_eq!(chart.values, vec![0.1, 0.1]);
    }

    #[test]
    fn test_p_chart_clamped_to_unit_interval() {
        let chart = p_chart(&[1, 0, 1], &[2, 2, 2]).unwrap();
        for limits in &chart.limits {
            assert!(limits.lcl >= 0.0);
            assert!(limits.ucl <= 1.0);
        }
    }

    #[test]
    fn test_p_chart_errors() {
        assert!(matches!(
            p_chart(&[1, 2], &[10]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            p_chart(&[1], &[10]),
            Err(Error::InsufficientData { .. })
        ));
        assert!(matches!(
            p_chart(&[1, 2], &[10, 0]),
            Err(Error::InvalidParams { .. })
        ));
        assert!(matches!(
            p_chart(&[11, 2], &[10, 10]),
            Err(Error::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_np_chart() {
        let chart = np_chart(&[4, 6, 5, 5], 100).unwrap();
        assert_eq!(chart.center, 5.0);
        let expected = 3.0 * (5.0_f64 * 0.95).sqrt();
        assert!((chart.limits[0].ucl - (5.0 + expected)).abs() < 1e-12);
        assert_eq!(chart.limits.len(), 4);
        assert!(np_chart(&[4, 6], 0).is_err());
        assert!(np_chart(&[4, 600], 100).is_err());
    }

    #[test]
    fn test_c_chart_detects_spike() {
        let chart = c_chart(&[3, 4, 2, 3, 5, 3, 4, 20]).unwrap();
        assert_eq!(chart.beyond_limits(), vec![7]);
        assert!(matches!(c_chart(&[3]), Err(Error::InsufficientData { .. })));
    }

    #[test]
    fn test_count_totals_overflow() {
        let huge = [u64::MAX, 1];
        assert!(matches!(c_chart(&huge), Err(Error::InvalidParams { .. })));
        assert!(matches!(
            np_chart(&[u64::MAX - 1, 2], u64::MAX),
            Err(Error::InvalidParams { .. })
        ));
        assert!(matches!(
            p_chart(&[1, 1], &[u64::MAX, u64::MAX]),
            Err(Error::InvalidParams { .. })
        ));
        assert!(matches!(
            u_chart(&huge, &[1.0, 1.0]),
            Err(Error::InvalidParams { .. })
        ));
        assert_eq!(checked_total(&[3, 4, 5], "counts").unwrap(), 12);
    }

    #[test]
    fn test_u_chart() {
        let chart = u_chart(&[10, 30], &[5.0, 10.0]).unwrap();
        let u_bar = 40.0 / 15.0;
        assert!((chart.center - u_bar).abs() < 1e-12);
        assert_eq!(chart.values, vec![2.0, 3.0]);
        assert!((chart.limits[1].ucl - (u_bar + 3.0 * (u_bar / 10.0).sqrt())).abs() < 1e-12);
        assert!(chart.limits[0].ucl > chart.limits[1].ucl);
        assert!(u_chart(&[1, 2], &[1.0, 0.0]).is_err());
        assert!(matches!(
            u_chart(&[1, 2, 3], &[1.0, 1.0]),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
