//! Core control chart types.
//!
//! Defines the building blocks shared by every chart family: control
//! limits, a plotted series governed by one set of limits, and an
//! attribute series whose limits may vary point by point.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Control limits for a chart.
///
/// # Invariants
///
/// - `lcl <= cl <= ucl`
/// - All values are finite
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Build limits, checking ordering and finiteness.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` if any value is non-finite or `lcl <= cl <= ucl`
    /// does not hold.
    pub fn new(ucl: f64, cl: f64, lcl: f64) -> Result<Self> {
        if !(ucl.is_finite() && cl.is_finite() && lcl.is_finite()) {
            return Err(Error::invalid_params("control limits must be finite"));
        }
        if !(lcl <= cl && cl <= ucl) {
            return Err(Error::invalid_params(format!(
                "control limits out of order: lcl={lcl}, cl={cl}, ucl={ucl}"
            )));
        }
        Ok(Self { ucl, cl, lcl })
    }

    /// One-sigma width implied by the upper limit, (UCL − CL)/3.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        (self.ucl - self.cl) / 3.0
    }

    /// Whether `value` lies strictly outside the limits.
    #[must_use]
    pub fn is_beyond(&self, value: f64) -> bool {
        value > self.ucl || value < self.lcl
    }
}

impl fmt::Display for ControlLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UCL={:.4}, CL={:.4}, LCL={:.4}",
            self.ucl, self.cl, self.lcl
        )
    }
}

/// Kind of plotted statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChartType {
    /// Subgroup means.
    XBar,
    /// Subgroup ranges.
    Range,
    /// Subgroup standard deviations.
    StdDev,
    /// Individual observations.
    Individuals,
    /// Moving ranges of individual observations.
    MovingRange,
    /// Proportion nonconforming.
    P,
    /// Number nonconforming (constant sample size).
    Np,
    /// Count of defects.
    C,
    /// Defects per unit.
    U,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::XBar => "X-bar",
            Self::Range => "R",
            Self::StdDev => "S",
            Self::Individuals => "I",
            Self::MovingRange => "MR",
            Self::P => "p",
            Self::Np => "np",
            Self::C => "c",
            Self::U => "u",
        };
        f.write_str(name)
    }
}

/// A plotted series governed by a single set of limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartSeries {
    /// Kind of statistic plotted.
    pub chart_type: ChartType,
    /// Plotted values, one per subgroup or observation.
    pub values: Vec<f64>,
    /// Limits for every point of the series.
    pub limits: ControlLimits,
}

impl ChartSeries {
    /// Indices of points strictly outside the limits.
    #[must_use]
    pub fn beyond_limits(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| self.limits.is_beyond(v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether no point lies outside the limits.
    #[must_use]
    pub fn is_in_control(&self) -> bool {
        self.beyond_limits().is_empty()
    }
}

/// An attribute chart whose limits may differ per point.
///
/// p and u charts with varying sample sizes carry one set of limits per
/// point; c and np charts repeat the same limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttributeChart {
    /// Kind of statistic plotted.
    pub chart_type: ChartType,
    /// Plotted values, one per sample.
    pub values: Vec<f64>,
    /// Center line shared by all points (p̄, np̄, c̄ or ū).
    pub center: f64,
    /// Limits for each point, aligned with `values`.
    pub limits: Vec<ControlLimits>,
}

impl AttributeChart {
    /// Indices of points strictly outside their own limits.
    #[must_use]
    pub fn beyond_limits(&self) -> Vec<usize> {
        self.values
            .iter()
            .zip(&self.limits)
            .enumerate()
            .filter(|&(_, (&v, limits))| limits.is_beyond(v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether no point lies outside its limits.
    #[must_use]
    pub fn is_in_control(&self) -> bool {
        self.beyond_limits().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_limits_construction() {
        let limits = ControlLimits::new(30.0, 25.0, 20.0).unwrap();
        assert!((limits.sigma() - 5.0 / 3.0).abs() < 1e-12);
        assert!(limits.is_beyond(30.1));
        assert!(!limits.is_beyond(30.0));
        assert!(!limits.is_beyond(20.0));
        assert_eq!(limits.to_string(), "UCL=30.0000, CL=25.0000, LCL=20.0000");

        assert!(ControlLimits::new(20.0, 25.0, 30.0).is_err());
        assert!(ControlLimits::new(f64::NAN, 25.0, 20.0).is_err());
    }

    #[test]
    fn test_series_beyond_limits() {
        let series = ChartSeries {
            chart_type: ChartType::Individuals,
            values: vec![25.0, 31.0, 19.0, 30.0],
            limits: ControlLimits {
                ucl: 30.0,
                cl: 25.0,
                lcl: 20.0,
            },
        };
        assert_eq!(series.beyond_limits(), vec![1, 2]);
        assert!(!series.is_in_control());
    }

    #[test]
    fn test_attribute_chart_per_point_limits() {
        let chart = AttributeChart {
            chart_type: ChartType::P,
            values: vec![0.2, 0.2],
            center: 0.1,
            limits: vec![
                ControlLimits {
                    ucl: 0.25,
                    cl: 0.1,
                    lcl: 0.0,
                },
                ControlLimits {
                    ucl: 0.15,
                    cl: 0.1,
                    lcl: 0.05,
                },
            ],
        };
        assert_eq!(chart.beyond_limits(), vec![1]);
        assert_eq!(ChartType::Np.to_string(), "np");
    }
}
