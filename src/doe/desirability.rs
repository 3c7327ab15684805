//! Derringer–Suich desirability functions and multi-response optimization.
//!
//! Each transfer function maps a response value onto [0, 1]; the overall
//! desirability of several responses is their geometric mean, so a single
//! unacceptable response (d = 0) makes the whole setting unacceptable.

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::RsmModel;
use crate::design::rotatable_alpha;
use crate::error::{Error, Result};

fn check_finite(values: &[f64], what: &str) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::invalid_params(format!("{what} must be finite")))
    }
}

/// Desirability of hitting `target` within ±`tolerance`.
///
/// Returns `(1 − |y − target| / tolerance)²` inside the tolerance band and 0
/// outside it.
///
/// # Errors
///
/// Returns `InvalidParams` if `tolerance <= 0` or any input is not finite.
///
/// # Example
///
/// ```
/// use doe_sqc::doe::target_desirability;
///
/// assert_eq!(target_desirability(10.0, 10.0, 2.0).unwrap(), 1.0);
/// assert_eq!(target_desirability(11.0, 10.0, 2.0).unwrap(), 0.25);
/// assert_eq!(target_desirability(12.0, 10.0, 2.0).unwrap(), 0.0);
/// ```
pub fn target_desirability(y: f64, target: f64, tolerance: f64) -> Result<f64> {
    check_finite(&[y, target, tolerance], "target desirability inputs")?;
    if tolerance <= 0.0 {
        return Err(Error::invalid_params(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }
    let deviation = (y - target).abs();
    if deviation >= tolerance {
        return Ok(0.0);
    }
    Ok((1.0 - deviation / tolerance).powi(2))
}

/// Desirability of a larger-is-better response.
///
/// 0 for `y <= lower`, `((y − lower) / (target − lower))²` in between and 1
/// for `y >= target`.
///
/// # Errors
///
/// Returns `InvalidParams` if `target <= lower` or any input is not finite.
pub fn maximize_desirability(y: f64, lower: f64, target: f64) -> Result<f64> {
    check_finite(&[y, lower, target], "maximize desirability inputs")?;
    if target <= lower {
        return Err(Error::invalid_params(format!(
            "target ({target}) must exceed lower bound ({lower})"
        )));
    }
    Ok(if y <= lower {
        0.0
    } else if y >= target {
        1.0
    } else {
        ((y - lower) / (target - lower)).powi(2)
    })
}

/// Desirability of a smaller-is-better response.
///
/// 1 for `y <= target`, `((upper − y) / (upper − target))²` in between and
/// 0 for `y >= upper`.
///
/// # Errors
///
/// Returns `InvalidParams` if `upper <= target` or any input is not finite.
pub fn minimize_desirability(y: f64, target: f64, upper: f64) -> Result<f64> {
    check_finite(&[y, target, upper], "minimize desirability inputs")?;
    if upper <= target {
        return Err(Error::invalid_params(format!(
            "upper bound ({upper}) must exceed target ({target})"
        )));
    }
    Ok(if y <= target {
        1.0
    } else if y >= upper {
        0.0
    } else {
        ((upper - y) / (upper - target)).powi(2)
    })
}

/// Overall desirability: the geometric mean `(Π dᵢ)^(1/n)`.
///
/// Returns 0 as soon as any score is 0 and the score itself when there is
/// only one.
///
/// # Errors
///
/// - `EmptyDataset` for an empty slice
/// - `InvalidParams` if any score lies outside [0, 1]
///
/// # Example
///
/// ```
/// use doe_sqc::doe::overall_desirability;
///
/// assert_eq!(overall_desirability(&[0.64]).unwrap(), 0.64);
/// assert_eq!(overall_desirability(&[0.9, 0.0, 0.8]).unwrap(), 0.0);
/// assert!((overall_desirability(&[0.25, 1.0]).unwrap() - 0.5).abs() < 1e-12);
/// ```
pub fn overall_desirability(desirabilities: &[f64]) -> Result<f64> {
    if desirabilities.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if let Some(bad) = desirabilities
        .iter()
        .find(|d| !(0.0..=1.0).contains(*d))
    {
        return Err(Error::invalid_params(format!(
            "desirability must lie in [0, 1], got {bad}"
        )));
    }
    if let [single] = desirabilities {
        return Ok(*single);
    }
    if desirabilities.iter().any(|&d| d == 0.0) {
        return Ok(0.0);
    }
    // Mean of logs avoids underflow of the raw product
    let mean_log =
        desirabilities.iter().map(|d| d.ln()).sum::<f64>() / desirabilities.len() as f64;
    Ok(mean_log.exp())
}

/// Optimization goal for one response.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DesirabilityGoal {
    /// Hit `target` within ±`tolerance`.
    Target {
        /// Ideal value.
        target: f64,
        /// Half-width of the acceptable band.
        tolerance: f64,
    },
    /// Larger is better, fully desirable from `target` upward.
    Maximize {
        /// Value at or below which desirability is 0.
        lower: f64,
        /// Value at or above which desirability is 1.
        target: f64,
    },
    /// Smaller is better, fully desirable from `target` downward.
    Minimize {
        /// Value at or below which desirability is 1.
        target: f64,
        /// Value at or above which desirability is 0.
        upper: f64,
    },
}

impl DesirabilityGoal {
    /// Desirability of response value `y` under this goal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` if the goal's bounds are inconsistent.
    pub fn evaluate(&self, y: f64) -> Result<f64> {
        match *self {
            Self::Target { target, tolerance } => target_desirability(y, target, tolerance),
            Self::Maximize { lower, target } => maximize_desirability(y, lower, target),
            Self::Minimize { target, upper } => minimize_desirability(y, target, upper),
        }
    }
}

/// A fitted response model paired with its optimization goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResponseGoal {
    /// Fitted second-order model of the response.
    pub model: RsmModel,
    /// Desirability goal for the response.
    pub goal: DesirabilityGoal,
}

/// Square search grid in coded units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    /// Lower bound of both coded axes (default: −α of a rotatable 2-factor CCD).
    pub lower: f64,
    /// Upper bound of both coded axes (default: +α of a rotatable 2-factor CCD).
    pub upper: f64,
    /// Grid points per axis, including both bounds (default: 41).
    pub steps: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        let alpha = rotatable_alpha(2);
        Self {
            lower: -alpha,
            upper: alpha,
            steps: 41,
        }
    }
}

/// Best grid setting found by [`optimize_desirability`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesirabilityOptimum {
    /// Coded x1 setting.
    pub x1: f64,
    /// Coded x2 setting.
    pub x2: f64,
    /// Predicted value of each response, in goal order.
    pub predictions: Vec<f64>,
    /// Individual desirability of each response, in goal order.
    pub desirabilities: Vec<f64>,
    /// Overall (geometric-mean) desirability.
    pub overall: f64,
}

/// Maximize the overall desirability of several fitted responses over a
/// square grid in coded units.
///
/// Ties keep the first grid point visited (x1 outer, x2 inner, both
/// ascending).
///
/// # Errors
///
/// - `EmptyDataset` if `goals` is empty
/// - `InvalidParams` if the grid has fewer than 2 steps, non-finite bounds or
///   `upper <= lower`, or if any goal is inconsistent
pub fn optimize_desirability(
    goals: &[ResponseGoal],
    config: &GridConfig,
) -> Result<DesirabilityOptimum> {
    if goals.is_empty() {
        return Err(Error::EmptyDataset);
    }
    check_finite(&[config.lower, config.upper], "grid bounds")?;
    if config.steps < 2 || config.upper <= config.lower {
        return Err(Error::invalid_params(format!(
            "grid needs at least 2 steps over a non-empty range, got {} steps on [{}, {}]",
            config.steps, config.lower, config.upper
        )));
    }

    let step = (config.upper - config.lower) / (config.steps - 1) as f64;
    let mut best: Option<DesirabilityOptimum> = None;

    for i in 0..config.steps {
        let x1 = config.lower + i as f64 * step;
        for j in 0..config.steps {
            let x2 = config.lower + j as f64 * step;

            let predictions: Vec<f64> = goals.iter().map(|g| g.model.predict(x1, x2)).collect();
            let desirabilities = goals
                .iter()
                .zip(&predictions)
                .map(|(g, &y)| g.goal.evaluate(y))
                .collect::<Result<Vec<f64>>>()?;
            let overall = overall_desirability(&desirabilities)?;

            if best.as_ref().map_or(true, |b| overall > b.overall) {
                best = Some(DesirabilityOptimum {
                    x1,
                    x2,
                    predictions,
                    desirabilities,
                    overall,
                });
            }
        }
    }

    let best = best.ok_or(Error::EmptyDataset)?;
    debug!(
        responses = goals.len(),
        x1 = best.x1,
        x2 = best.x2,
        overall = best.overall,
        "desirability optimum"
    );
    Ok(best)
}
