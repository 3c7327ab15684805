//! Variables control charts: X̄-R, X̄-S and Individuals/Moving Range.
//!
//! # Algorithm
//!
//! For k subgroups of equal size n:
//!
//! 1. Compute each subgroup's mean and dispersion (range or sample std).
//! 2. Grand mean X̿ and average dispersion R̄ (or S̄).
//! 3. X̄ limits: X̿ ± A2·R̄ (or A3·S̄).
//! 4. Dispersion limits: D3·R̄ / D4·R̄ (or B3·S̄ / B4·S̄).
//!
//! Individual observations use the moving range of a sliding window in
//! place of a subgroup range.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 6.

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::chart::{ChartSeries, ChartType, ControlLimits};
use super::constants::get_constants;
use crate::error::{Error, Result};
use crate::stats::{mean, range, sample_std_dev};

/// Minimum number of subgroups or observations for any chart.
pub const MIN_CHART_POINTS: usize = 2;

/// X̄-R chart: subgroup means with a range chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XbarRChart {
    /// Subgroup means with X̿ ± A2·R̄ limits.
    pub xbar: ChartSeries,
    /// Subgroup ranges with D3·R̄ / D4·R̄ limits.
    pub range: ChartSeries,
    /// Process sigma estimate R̄/d2.
    pub sigma_hat: f64,
    /// Subgroup size n.
    pub subgroup_size: usize,
}

/// X̄-S chart: subgroup means with a standard-deviation chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XbarSChart {
    /// Subgroup means with X̿ ± A3·S̄ limits.
    pub xbar: ChartSeries,
    /// Subgroup standard deviations with B3·S̄ / B4·S̄ limits.
    pub std_dev: ChartSeries,
    /// Process sigma estimate S̄/c4.
    pub sigma_hat: f64,
    /// Subgroup size n.
    pub subgroup_size: usize,
}

/// Configuration for the Individuals/Moving Range chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IMrConfig {
    /// Number of consecutive observations per moving range (default: 2).
    pub mr_span: usize,
}

impl Default for IMrConfig {
    fn default() -> Self {
        Self { mr_span: 2 }
    }
}

/// Individuals chart with its moving-range chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IMrChart {
    /// Individual observations with mean ± 3σ̂ limits.
    pub individuals: ChartSeries,
    /// Moving ranges with D3·MR̄ / D4·MR̄ limits; one per full window.
    pub moving_range: ChartSeries,
    /// Process sigma estimate MR̄/d2(span).
    pub sigma_hat: f64,
    /// Window length used for the moving range.
    pub mr_span: usize,
}

fn check_values(values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::invalid_params("measurements must be finite"))
    }
}

/// Validate subgroups: at least two, uniform size of at least two, finite.
fn validate_subgroups<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<usize> {
    if subgroups.len() < MIN_CHART_POINTS {
        return Err(Error::insufficient(
            "control chart subgroups",
            MIN_CHART_POINTS,
            subgroups.len(),
        ));
    }
    let n = subgroups[0].as_ref().len();
    if n < 2 {
        return Err(Error::insufficient("subgroup size", 2, n));
    }
    for (index, subgroup) in subgroups.iter().enumerate() {
        let subgroup = subgroup.as_ref();
        if subgroup.len() != n {
            return Err(Error::InconsistentSubgroupSize {
                index,
                expected: n,
                actual: subgroup.len(),
            });
        }
        check_values(subgroup)?;
    }
    Ok(n)
}

/// Per-subgroup means and dispersions.
fn subgroup_stats<S: AsRef<[f64]>>(
    subgroups: &[S],
    dispersion: fn(&[f64]) -> Option<f64>,
) -> (Vec<f64>, Vec<f64>) {
    subgroups
        .iter()
        .map(|s| {
            let s = s.as_ref();
            (
                mean(s).unwrap_or_default(),
                dispersion(s).unwrap_or_default(),
            )
        })
        .unzip()
}

fn average(values: &[f64]) -> f64 {
    mean(values).unwrap_or_default()
}

/// Compute X̄-R chart limits for equal-size subgroups.
///
/// # Errors
///
/// - `InsufficientData` with fewer than 2 subgroups or a subgroup size below 2
/// - `InconsistentSubgroupSize` if subgroup sizes differ
/// - `InvalidParams` for non-finite measurements
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::xbar_r;
///
/// let subgroups = vec![
///     vec![10.0, 12.0, 11.0, 13.0, 9.0],
///     vec![11.0, 10.0, 12.0, 11.0, 11.0],
///     vec![12.0, 11.0, 10.0, 12.0, 10.0],
/// ];
/// let chart = xbar_r(&subgroups).unwrap();
/// assert!(chart.xbar.limits.ucl > chart.xbar.limits.cl);
/// assert!(chart.xbar.beyond_limits().is_empty());
/// ```
pub fn xbar_r<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<XbarRChart> {
    let n = validate_subgroups(subgroups)?;
    let constants = get_constants(n);

    let (means, ranges) = subgroup_stats(subgroups, range);
    let grand_mean = average(&means);
    let r_bar = average(&ranges);

    let xbar = ChartSeries {
        chart_type: ChartType::XBar,
        values: means,
        limits: ControlLimits {
            ucl: grand_mean + constants.a2 * r_bar,
            cl: grand_mean,
            lcl: grand_mean - constants.a2 * r_bar,
        },
    };
    let range_chart = ChartSeries {
        chart_type: ChartType::Range,
        values: ranges,
        limits: ControlLimits {
            ucl: constants.d4 * r_bar,
            cl: r_bar,
            lcl: constants.d3 * r_bar,
        },
    };

    debug!(subgroups = subgroups.len(), n, grand_mean, r_bar, "computed X-bar/R limits");

    Ok(XbarRChart {
        xbar,
        range: range_chart,
        sigma_hat: r_bar / constants.d2,
        subgroup_size: n,
    })
}

/// Compute X̄-S chart limits for equal-size subgroups.
///
/// # Errors
///
/// Same as [`xbar_r`].
pub fn xbar_s<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<XbarSChart> {
    let n = validate_subgroups(subgroups)?;
    let constants = get_constants(n);

    let (means, std_devs) = subgroup_stats(subgroups, sample_std_dev);
    let grand_mean = average(&means);
    let s_bar = average(&std_devs);

    let xbar = ChartSeries {
        chart_type: ChartType::XBar,
        values: means,
        limits: ControlLimits {
            ucl: grand_mean + constants.a3 * s_bar,
            cl: grand_mean,
            lcl: grand_mean - constants.a3 * s_bar,
        },
    };
    let std_dev = ChartSeries {
        chart_type: ChartType::StdDev,
        values: std_devs,
        limits: ControlLimits {
            ucl: constants.b4 * s_bar,
            cl: s_bar,
            lcl: constants.b3 * s_bar,
        },
    };

    debug!(subgroups = subgroups.len(), n, grand_mean, s_bar, "computed X-bar/S limits");

    Ok(XbarSChart {
        xbar,
        std_dev,
        sigma_hat: s_bar / constants.c4,
        subgroup_size: n,
    })
}

/// Compute Individuals/Moving Range chart limits.
///
/// Each moving range is `max − min` over a window of `mr_span` consecutive
/// observations, so there are `len − mr_span + 1` of them.
///
/// # Errors
///
/// - `InvalidParams` if `mr_span < 2` or a measurement is non-finite
/// - `InsufficientData` if the series is shorter than 2 or than `mr_span`
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::{i_mr, IMrConfig};
///
/// let data = [10.0, 12.0, 11.0, 13.0, 12.0];
/// let chart = i_mr(&data, &IMrConfig::default()).unwrap();
/// assert_eq!(chart.moving_range.values, vec![2.0, 1.0, 2.0, 1.0]);
/// assert!((chart.sigma_hat - 1.5 / 1.128).abs() < 1e-12);
/// ```
pub fn i_mr(series: &[f64], config: &IMrConfig) -> Result<IMrChart> {
    let span = config.mr_span;
    if span < 2 {
        return Err(Error::invalid_params(format!(
            "moving-range span must be at least 2, got {span}"
        )));
    }
    let required = span.max(MIN_CHART_POINTS);
    if series.len() < required {
        return Err(Error::insufficient(
            "individuals chart observations",
            required,
            series.len(),
        ));
    }
    check_values(series)?;

    let constants = get_constants(span);
    let moving_ranges: Vec<f64> = series
        .windows(span)
        .map(|w| range(w).unwrap_or_default())
        .collect();
    let mr_bar = average(&moving_ranges);
    let center = average(series);
    let sigma_hat = mr_bar / constants.d2;

    let individuals = ChartSeries {
        chart_type: ChartType::Individuals,
        values: series.to_vec(),
        limits: ControlLimits {
            ucl: center + 3.0 * sigma_hat,
            cl: center,
            lcl: center - 3.0 * sigma_hat,
        },
    };
    let moving_range = ChartSeries {
        chart_type: ChartType::MovingRange,
        values: moving_ranges,
        limits: ControlLimits {
            ucl: constants.d4 * mr_bar,
            cl: mr_bar,
            lcl: constants.d3 * mr_bar,
        },
    };

    debug!(points = series.len(), span, center, mr_bar, "computed I-MR limits");

    Ok(IMrChart {
        individuals,
        moving_range,
        sigma_hat,
        mr_span: span,
    })
}
