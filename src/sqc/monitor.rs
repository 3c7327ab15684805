//! Sequential monitors: tabular CUSUM and EWMA.
//!
//! Both charts accumulate information across observations. They detect
//! small sustained shifts that a Shewhart chart misses.
//!
//! # References
//!
//! - Page, E.S. (1954). "Continuous Inspection Schemes", *Biometrika* 41(1/2).
//! - Roberts, S.W. (1959). "Control Chart Tests Based on Geometric Moving
//!   Averages", *Technometrics* 1(3).
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, Chapter 9.

use std::fmt;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::sample_std_dev;

/// Direction of a detected shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShiftDirection {
    /// Shift above the target.
    Upper,
    /// Shift below the target.
    Lower,
}

impl fmt::Display for ShiftDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => f.write_str("upper"),
            Self::Lower => f.write_str("lower"),
        }
    }
}

/// An out-of-control signal at one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorSignal {
    /// 0-based index of the observation.
    pub index: usize,
    /// Side of the target the shift lies on.
    pub direction: ShiftDirection,
}

/// Tabular CUSUM parameters, in the units of the data.
///
/// Defaults: `target = 0`, `k = 0.5`, `h = 5` (the usual choice for
/// standardized data, detecting a 1σ shift).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CusumConfig {
    /// In-control mean.
    pub target: f64,
    /// Allowance (slack), typically half the shift to detect.
    pub k: f64,
    /// Decision interval.
    pub h: f64,
}

impl Default for CusumConfig {
    fn default() -> Self {
        Self {
            target: 0.0,
            k: 0.5,
            h: 5.0,
        }
    }
}

/// Upper and lower cumulative sums for every observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CusumResult {
    /// C⁺ᵢ.
    pub upper: Vec<f64>,
    /// C⁻ᵢ.
    pub lower: Vec<f64>,
    /// Points where either sum exceeds `h`, upper before lower.
    pub signals: Vec<MonitorSignal>,
}

/// Run a two-sided tabular CUSUM.
///
/// ```text
/// C⁺ᵢ = max(0, xᵢ − (target + k) + C⁺ᵢ₋₁)
/// C⁻ᵢ = max(0, (target − k) − xᵢ + C⁻ᵢ₋₁)
/// ```
///
/// with C⁺₀ = C⁻₀ = 0. A signal is raised when a sum strictly exceeds `h`.
///
/// # Errors
///
/// - `EmptyDataset` if `data` is empty
/// - `InvalidParams` if `k` or `h` is not positive and finite, the target is
///   not finite, or the data contain a non-finite value
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::{cusum, CusumConfig, ShiftDirection};
///
/// let mut data = vec![0.0; 5];
/// data.extend([2.0; 5]);
/// let result = cusum(&data, &CusumConfig::default()).unwrap();
///
/// assert_eq!(result.signals[0].index, 8);
/// assert_eq!(result.signals[0].direction, ShiftDirection::Upper);
/// ```
pub fn cusum(data: &[f64], config: &CusumConfig) -> Result<CusumResult> {
    let CusumConfig { target, k, h } = *config;
    if !(k.is_finite() && k > 0.0) {
        return Err(Error::invalid_params(format!(
            "CUSUM allowance k must be positive and finite, got {k}"
        )));
    }
    if !(h.is_finite() && h > 0.0) {
        return Err(Error::invalid_params(format!(
            "CUSUM decision interval h must be positive and finite, got {h}"
        )));
    }
    if !target.is_finite() {
        return Err(Error::invalid_params("CUSUM target must be finite"));
    }
    if data.is_empty() {
        return Err(Error::EmptyDataset);
    }
    check_finite(data)?;

    let mut upper = Vec::with_capacity(data.len());
    let mut lower = Vec::with_capacity(data.len());
    let mut signals = Vec::new();
    let (mut c_plus, mut c_minus) = (0.0_f64, 0.0_f64);

    for (i, &x) in data.iter().enumerate() {
        c_plus = (x - (target + k) + c_plus).max(0.0);
        c_minus = ((target - k) - x + c_minus).max(0.0);
        upper.push(c_plus);
        lower.push(c_minus);

        if c_plus > h {
            signals.push(MonitorSignal {
                index: i,
                direction: ShiftDirection::Upper,
            });
        }
        if c_minus > h {
            signals.push(MonitorSignal {
                index: i,
                direction: ShiftDirection::Lower,
            });
        }
    }

    debug!(n = data.len(), k, h, signals = signals.len(), "ran CUSUM");

    Ok(CusumResult {
        upper,
        lower,
        signals,
    })
}

/// EWMA parameters.
///
/// Defaults: `lambda = 0.2`, `l = 3.0`, `target = 0`, σ estimated from the
/// data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EwmaConfig {
    /// In-control mean, also the starting value z₀.
    pub target: f64,
    /// Smoothing constant in (0, 1].
    pub lambda: f64,
    /// Limit width in multiples of the statistic's standard deviation.
    pub l: f64,
    /// Process standard deviation; the sample standard deviation when `None`.
    pub sigma: Option<f64>,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            target: 0.0,
            lambda: 0.2,
            l: 3.0,
            sigma: None,
        }
    }
}

/// EWMA statistics and their time-varying limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EwmaResult {
    /// zᵢ for every observation.
    pub statistics: Vec<f64>,
    /// Upper limit at each observation.
    pub ucl: Vec<f64>,
    /// Lower limit at each observation.
    pub lcl: Vec<f64>,
    /// σ used for the limits.
    pub sigma: f64,
    /// Points where zᵢ lies strictly outside its limits.
    pub signals: Vec<MonitorSignal>,
}

/// Run an EWMA chart.
///
/// zᵢ = λxᵢ + (1 − λ)zᵢ₋₁ with z₀ = target. The limits at the 1-based
/// observation i are
///
/// ```text
/// target ± L·σ·√(λ/(2 − λ)·(1 − (1 − λ)^(2i)))
/// ```
///
/// # Errors
///
/// - `EmptyDataset` if `data` is empty
/// - `InsufficientData` if σ must be estimated from fewer than 2 points
/// - `InvalidParams` if `lambda` is outside (0, 1], `l <= 0`, σ is negative,
///   or any input is non-finite
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::{ewma, EwmaConfig};
///
/// let config = EwmaConfig {
///     target: 10.0,
///     sigma: Some(1.0),
///     ..EwmaConfig::default()
/// };
/// let result = ewma(&[10.2, 9.9, 10.1, 13.0, 13.5, 14.0], &config).unwrap();
///
/// assert!((result.statistics[0] - 10.04).abs() < 1e-12);
/// assert!(!result.signals.is_empty());
/// ```
pub fn ewma(data: &[f64], config: &EwmaConfig) -> Result<EwmaResult> {
    let EwmaConfig {
        target,
        lambda,
        l,
        sigma,
    } = *config;
    if !(lambda.is_finite() && lambda > 0.0 && lambda <= 1.0) {
        return Err(Error::invalid_params(format!(
            "EWMA lambda must lie in (0, 1], got {lambda}"
        )));
    }
    if !(l.is_finite() && l > 0.0) {
        return Err(Error::invalid_params(format!(
            "EWMA limit width L must be positive and finite, got {l}"
        )));
    }
    if !target.is_finite() {
        return Err(Error::invalid_params("EWMA target must be finite"));
    }
    if data.is_empty() {
        return Err(Error::EmptyDataset);
    }
    check_finite(data)?;

    let sigma = match sigma {
        Some(s) if s.is_finite() && s >= 0.0 => s,
        Some(s) => {
            return Err(Error::invalid_params(format!(
                "EWMA sigma must be non-negative and finite, got {s}"
            )))
        }
        None => {
            if data.len() < 2 {
                return Err(Error::insufficient("EWMA sigma estimate", 2, data.len()));
            }
            sample_std_dev(data).ok_or(Error::EmptyDataset)?
        }
    };

    let n = data.len();
    let mut statistics = Vec::with_capacity(n);
    let mut ucl = Vec::with_capacity(n);
    let mut lcl = Vec::with_capacity(n);
    let mut signals = Vec::new();
    let mut z = target;

    for (i, &x) in data.iter().enumerate() {
        z += lambda * (x - z);
        let half_width = ewma_half_width(lambda, l, sigma, i + 1);
        let (upper, lower) = (target + half_width, target - half_width);

        if z > upper {
            signals.push(MonitorSignal {
                index: i,
                direction: ShiftDirection::Upper,
            });
        } else if z < lower {
            signals.push(MonitorSignal {
                index: i,
                direction: ShiftDirection::Lower,
            });
        }

        statistics.push(z);
        ucl.push(upper);
        lcl.push(lower);
    }

    debug!(n, lambda, l, sigma, signals = signals.len(), "ran EWMA");

    Ok(EwmaResult {
        statistics,
        ucl,
        lcl,
        sigma,
        signals,
    })
}

/// Limit half-width at the 1-based observation `i`.
fn ewma_half_width(lambda: f64, l: f64, sigma: f64, i: usize) -> f64 {
    let asymptotic = lambda / (2.0 - lambda);
    let exponent = i32::try_from(i.saturating_mul(2)).unwrap_or(i32::MAX);
    let decay = (1.0 - lambda).powi(exponent);
    l * sigma * (asymptotic * (1.0 - decay)).sqrt()
}

fn check_finite(data: &[f64]) -> Result<()> {
    match data.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::invalid_params(format!(
            "observation {i} is not finite"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cusum_in_control_stays_near_zero() {
        let data = [0.1, -0.2, 0.3, -0.1, 0.0, 0.2, -0.3];
        let r = cusum(&data, &CusumConfig::default()).unwrap();
        assert!(r.signals.is_empty());
        assert!(r.upper.iter().all(|&c| c == 0.0));
        assert!(r.lower.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_cusum_recursion() {
        let config = CusumConfig {
            target: 10.0,
            k: 0.5,
            h: 4.0,
        };
        let data = [11.0, 12.0, 9.0, 13.0, 12.5];
        let r = cusum(&data, &config).unwrap();
        // C⁺: 0.5, 2.0, 0.5, 3.0, 5.0
        let expected = [0.5, 2.0, 0.5, 3.0, 5.0];
        for (c, e) in r.upper.iter().zip(expected) {
            assert!((c - e).abs() < 1e-12);
        }
        // C⁻ only picks up the 9.0: 0, 0, 0.5, 0, 0
        assert!((r.lower[2] - 0.5).abs() < 1e-12);
        assert_eq!(r.lower[3], 0.0);
        assert_eq!(
            r.signals,
            vec![MonitorSignal {
                index: 4,
                direction: ShiftDirection::Upper
            }]
        );
    }

    #[test]
    fn test_cusum_downward_shift() {
        let mut data = vec![0.0; 3];
        data.extend([-2.0; 6]);
        let r = cusum(&data, &CusumConfig::default()).unwrap();
        let first = r.signals[0];
        assert_eq!(first.direction, ShiftDirection::Lower);
        // C⁻ grows 1.5 per point: 1.5, 3.0, 4.5, 6.0
        assert_eq!(first.index, 6);
        assert!(r
            .signals
            .iter()
            .all(|s| s.direction == ShiftDirection::Lower));
    }

    #[test]
    fn test_cusum_errors() {
        let bad_k = CusumConfig {
            k: 0.0,
            ..CusumConfig::default()
        };
        assert!(matches!(
            cusum(&[1.0], &bad_k),
            Err(Error::InvalidParams { .. })
        ));
        let bad_h = CusumConfig {
            h: f64::INFINITY,
            ..CusumConfig::default()
        };
        assert!(matches!(
            cusum(&[1.0], &bad_h),
            Err(Error::InvalidParams { .. })
        ));
        assert!(matches!(
            cusum(&[], &CusumConfig::default()),
            Err(Error::EmptyDataset)
        ));
        assert!(matches!(
            cusum(&[1.0, f64::NAN], &CusumConfig::default()),
            Err(Error::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_cusum_zero_noise_no_signals() {
        for target in [0.3, 0.1, 1.7, 25.4] {
            let config = CusumConfig {
                target,
                ..CusumConfig::default()
            };
            let r = cusum(&[target; 30], &config).unwrap();
            assert!(r.signals.is_empty(), "target {target}: {:?}", r.signals);
            assert!(r.upper.iter().chain(&r.lower).all(|&c| c == 0.0));
        }
    }

    #[test]
    fn test_ewma_zero_noise_no_signals() {
        for target in [0.3, 0.1, 1.7, 25.4, 3.3, 0.7] {
            let estimated = EwmaConfig {
                target,
                ..EwmaConfig::default()
            };
            let r = ewma(&[target; 30], &estimated).unwrap();
            assert!(r.signals.is_empty(), "target {target}: {:?}", r.signals);
            assert!(r.statistics.iter().all(|&z| z == target));

            let known = EwmaConfig {
                sigma: Some(0.5),
                ..estimated
            };
            assert!(ewma(&[target; 30], &known).unwrap().signals.is_empty());
        }
    }

    #[test]
    fn test_ewma_detects_sustained_shift() {
        // In-control prefix with sample std ≈ 0.525, then a shift of about 3σ to 11.5
        let mut data = vec![
            9.4, 10.5, 9.6, 10.4, 9.5, 10.6, 9.4, 10.5, 9.6, 10.4, 9.5, 10.6, 9.4, 10.5, 9.6,
            10.4, 9.5, 10.6, 9.4, 10.5,
        ];
        data.extend([11.5; 12]);
        let config = EwmaConfig {
            target: 10.0,
            sigma: None,
            ..EwmaConfig::default()
        };
        let r = ewma(&data, &config).unwrap();

        // σ comes from the whole series, shift included
        assert!((r.sigma - sample_std_dev(&data).unwrap()).abs() < 1e-12);
        let first = r.signals[0];
        assert_eq!(first.direction, ShiftDirection::Upper);
        assert_eq!(first.index, 23);
        assert!(r
            .signals
            .iter()
            .all(|s| s.direction == ShiftDirection::Upper && s.index >= 23));
        assert_eq!(r.signals.len(), data.len() - 23);
    }

    #[test]
    fn test_ewma_recursion_and_limits() {
        let config = EwmaConfig {
            target: 0.0,
            lambda: 0.5,
            l: 3.0,
            sigma: Some(1.0),
        };
        let r = ewma(&[1.0, 1.0], &config).unwrap();
        assert!((r.statistics[0] - 0.5).abs() < 1e-12);
        assert!((r.statistics[1] - 0.75).abs() < 1e-12);

        // i=1: 3·√(1/3·(1 − 0.25)) = 3·0.5 = 1.5
        assert!((r.ucl[0] - 1.5).abs() < 1e-12);
        assert!((r.lcl[0] + 1.5).abs() < 1e-12);
        assert!(r.signals.is_empty());
    }

    #[test]
    fn test_ewma_lambda_one_is_shewhart() {
        let config = EwmaConfig {
            target: 5.0,
            lambda: 1.0,
            l: 3.0,
            sigma: Some(1.0),
        };
        let r = ewma(&[5.0, 8.5, 1.0], &config).unwrap();
        assert_eq!(r.statistics, vec![5.0, 8.5, 1.0]);
        assert!(r.ucl.iter().all(|&u| (u - 8.0).abs() < 1e-12));
        assert_eq!(
            r.signals,
            vec![
                MonitorSignal {
                    index: 1,
                    direction: ShiftDirection::Upper
                },
                MonitorSignal {
                    index: 2,
                    direction: ShiftDirection::Lower
                },
            ]
        );
    }

    #[test]
    fn test_ewma_sigma_from_data() {
        let data = [9.0, 11.0, 10.0, 10.0];
        let config = EwmaConfig {
            target: 10.0,
            ..EwmaConfig::default()
        };
        let r = ewma(&data, &config).unwrap();
        let s = sample_std_dev(&data).unwrap();
        assert!((r.sigma - s).abs() < 1e-12);

        assert!(matches!(
            ewma(&[10.0], &config),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_ewma_errors() {
        for lambda in [0.0, -0.1, 1.5, f64::NAN] {
            let config = EwmaConfig {
                lambda,
                sigma: Some(1.0),
                ..EwmaConfig::default()
            };
            assert!(matches!(
                ewma(&[1.0, 2.0], &config),
                Err(Error::InvalidParams { .. })
            ));
        }
        let bad_l = EwmaConfig {
            l: 0.0,
            sigma: Some(1.0),
            ..EwmaConfig::default()
        };
        assert!(ewma(&[1.0, 2.0], &bad_l).is_err());
        let bad_sigma = EwmaConfig {
            sigma: Some(-1.0),
            ..EwmaConfig::default()
        };
        assert!(ewma(&[1.0, 2.0], &bad_sigma).is_err());
        assert!(matches!(
            ewma(&[], &EwmaConfig::default()),
            Err(Error::EmptyDataset)
        ));
    }

    proptest! {
        #[test]
        fn prop_ewma_half_width_non_decreasing(
            lambda in 0.01f64..=1.0,
            l in 0.5f64..4.0,
            sigma in 0.01f64..10.0,
        ) {
            let asymptote = l * sigma * (lambda / (2.0 - lambda)).sqrt();
            let mut prev = 0.0;
            for i in 1..200 {
                let w = ewma_half_width(lambda, l, sigma, i);
                prop_assert!(w + 1e-12 >= prev);
                prop_assert!(w <= asymptote + 1e-12);
                prev = w;
            }
        }

        #[test]
        fn prop_cusum_sums_non_negative(
            data in proptest::collection::vec(-10.0f64..10.0, 1..100),
        ) {
            let r = cusum(&data, &CusumConfig::default()).unwrap();
            prop_assert_eq!(r.upper.len(), data.len());
            prop_assert!(r.upper.iter().chain(&r.lower).all(|&c| c >= 0.0));
        }
    }
}
