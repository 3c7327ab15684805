//! Western Electric run rules for detecting non-random patterns.
//!
//! Eight pattern tests on a plotted series. Zones are measured in units of
//! σ = (UCL − CL)/3 from the center line:
//!
//! | Rule | Window | Pattern |
//! |------|--------|---------|
//! | 1 | 1 | point beyond the control limits |
//! | 2 | 9 | all points on one side of CL |
//! | 3 | 6 | strictly increasing or strictly decreasing |
//! | 4 | 14 | successive differences alternate in sign |
//! | 5 | 3 | 2 of 3 beyond 2σ on the same side |
//! | 6 | 5 | 4 of 5 beyond 1σ on the same side |
//! | 7 | 15 | all within 1σ of CL |
//! | 8 | 8 | all beyond 1σ, either side |
//!
//! Every window position is tested and each match is reported, so a long
//! run produces overlapping violations. All comparisons are strict: a point
//! exactly on a boundary does not count.
//!
//! # References
//!
//! - Western Electric (1956). *Statistical Quality Control Handbook*.
//! - Nelson, L.S. (1984). "The Shewhart Control Chart: Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::chart::ControlLimits;
use crate::error::{Error, Result};

/// One of the eight run rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WesternElectricRule {
    /// Rule 1: a point beyond the control limits.
    BeyondLimits,
    /// Rule 2: 9 points in a row on the same side of the center line.
    NineSameSide,
    /// Rule 3: 6 points in a row steadily increasing or decreasing.
    SixTrend,
    /// Rule 4: 14 points in a row alternating up and down.
    FourteenAlternating,
    /// Rule 5: 2 of 3 points beyond 2σ on the same side.
    TwoOfThreeBeyond2Sigma,
    /// Rule 6: 4 of 5 points beyond 1σ on the same side.
    FourOfFiveBeyond1Sigma,
    /// Rule 7: 15 points in a row within 1σ of the center line.
    FifteenWithin1Sigma,
    /// Rule 8: 8 points in a row beyond 1σ on either side.
    EightBeyond1Sigma,
}

impl WesternElectricRule {
    /// All rules in id order.
    pub const ALL: [Self; 8] = [
        Self::BeyondLimits,
        Self::NineSameSide,
        Self::SixTrend,
        Self::FourteenAlternating,
        Self::TwoOfThreeBeyond2Sigma,
        Self::FourOfFiveBeyond1Sigma,
        Self::FifteenWithin1Sigma,
        Self::EightBeyond1Sigma,
    ];

    /// Rule number, 1 through 8.
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::BeyondLimits => 1,
            Self::NineSameSide => 2,
            Self::SixTrend => 3,
            Self::FourteenAlternating => 4,
            Self::TwoOfThreeBeyond2Sigma => 5,
            Self::FourOfFiveBeyond1Sigma => 6,
            Self::FifteenWithin1Sigma => 7,
            Self::EightBeyond1Sigma => 8,
        }
    }

    /// Rule for a number 1 through 8.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.id() == id)
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::BeyondLimits => "point beyond control limits",
            Self::NineSameSide => "9 consecutive points on one side of the center line",
            Self::SixTrend => "6 consecutive points steadily increasing or decreasing",
            Self::FourteenAlternating => "14 consecutive points alternating up and down",
            Self::TwoOfThreeBeyond2Sigma => "2 of 3 consecutive points beyond 2 sigma on one side",
            Self::FourOfFiveBeyond1Sigma => "4 of 5 consecutive points beyond 1 sigma on one side",
            Self::FifteenWithin1Sigma => "15 consecutive points within 1 sigma of the center line",
            Self::EightBeyond1Sigma => "8 consecutive points beyond 1 sigma on either side",
        }
    }

    /// Number of consecutive points the rule inspects.
    #[must_use]
    pub fn window(self) -> usize {
        match self {
            Self::BeyondLimits => 1,
            Self::NineSameSide => 9,
            Self::SixTrend => 6,
            Self::FourteenAlternating => 14,
            Self::TwoOfThreeBeyond2Sigma => 3,
            Self::FourOfFiveBeyond1Sigma => 5,
            Self::FifteenWithin1Sigma => 15,
            Self::EightBeyond1Sigma => 8,
        }
    }
}

impl fmt::Display for WesternElectricRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}: {}", self.id(), self.description())
    }
}

/// A detected pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleViolation {
    /// The rule that fired.
    pub rule: WesternElectricRule,
    /// Indices of the offending points, ascending.
    pub points: Vec<usize>,
}

impl RuleViolation {
    /// Rule number, 1 through 8.
    #[must_use]
    pub fn rule_id(&self) -> u8 {
        self.rule.id()
    }

    /// Description of the rule that fired.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.rule.description()
    }
}

/// Zone geometry derived from the control limits.
struct Zones {
    cl: f64,
    ucl: f64,
    lcl: f64,
    sigma: f64,
}

impl Zones {
    fn new(limits: &ControlLimits) -> Result<Self> {
        let sigma = limits.sigma();
        if !(sigma.is_finite() && sigma > 0.0) || !limits.cl.is_finite() || !limits.lcl.is_finite()
        {
            return Err(Error::invalid_params(format!(
                "control limits must give a positive, finite sigma ({limits})"
            )));
        }
        Ok(Self {
            cl: limits.cl,
            ucl: limits.ucl,
            lcl: limits.lcl,
            sigma,
        })
    }

    /// Signed distance from the center line in sigma units.
    fn z(&self, value: f64) -> f64 {
        (value - self.cl) / self.sigma
    }
}

fn window_indices(start: usize, len: usize) -> Vec<usize> {
    (start..start + len).collect()
}

/// Rule 1: one violation per point outside [LCL, UCL].
fn check_beyond_limits(values: &[f64], zones: &Zones) -> Vec<Vec<usize>> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > zones.ucl || v < zones.lcl)
        .map(|(i, _)| vec![i])
        .collect()
}

/// Windows where every point satisfies `pred`.
fn check_all_in_window(
    values: &[f64],
    window: usize,
    pred: impl Fn(&[f64]) -> bool,
) -> Vec<Vec<usize>> {
    values
        .windows(window)
        .enumerate()
        .filter(|&(_, w)| pred(w))
        .map(|(start, _)| window_indices(start, window))
        .collect()
}

/// Windows where at least `required` points lie beyond `threshold` sigma on
/// the same side; only those points are reported.
fn check_k_of_n(
    values: &[f64],
    zones: &Zones,
    window: usize,
    required: usize,
    threshold: f64,
) -> Vec<Vec<usize>> {
    let mut found = Vec::new();
    for (start, w) in values.windows(window).enumerate() {
        for side in [1.0, -1.0] {
            let offending: Vec<usize> = w
                .iter()
                .enumerate()
                .filter(|&(_, &v)| side * zones.z(v) > threshold)
                .map(|(i, _)| start + i)
                .collect();
            if offending.len() >= required {
                found.push(offending);
            }
        }
    }
    found
}

fn evaluate_rule(rule: WesternElectricRule, values: &[f64], zones: &Zones) -> Vec<Vec<usize>> {
    use WesternElectricRule as R;

    let window = rule.window();
    if values.len() < window {
        return Vec::new();
    }

    match rule {
        R::BeyondLimits => check_beyond_limits(values, zones),
        R::NineSameSide => check_all_in_window(values, window, |w| {
            w.iter().all(|&v| v > zones.cl) || w.iter().all(|&v| v < zones.cl)
        }),
        R::SixTrend => check_all_in_window(values, window, |w| {
            w.windows(2).all(|p| p[1] > p[0]) || w.windows(2).all(|p| p[1] < p[0])
        }),
        R::FourteenAlternating => check_all_in_window(values, window, |w| {
            let diffs: Vec<f64> = w.windows(2).map(|p| p[1] - p[0]).collect();
            diffs.iter().all(|&d| d != 0.0) && diffs.windows(2).all(|d| d[0] * d[1] < 0.0)
        }),
        R::TwoOfThreeBeyond2Sigma => check_k_of_n(values, zones, window, 2, 2.0),
        R::FourOfFiveBeyond1Sigma => check_k_of_n(values, zones, window, 4, 1.0),
        R::FifteenWithin1Sigma => {
            check_all_in_window(values, window, |w| w.iter().all(|&v| zones.z(v).abs() < 1.0))
        }
        R::EightBeyond1Sigma => {
            check_all_in_window(values, window, |w| w.iter().all(|&v| zones.z(v).abs() > 1.0))
        }
    }
}

/// Evaluate a subset of the rules.
///
/// Output is ordered by rule id, then by window start. Duplicate entries in
/// `rules` are evaluated once.
///
/// # Errors
///
/// Returns `InvalidParams` if σ = (UCL − CL)/3 is not positive and finite or
/// any value is non-finite.
pub fn detect_rules(
    values: &[f64],
    limits: &ControlLimits,
    rules: &[WesternElectricRule],
) -> Result<Vec<RuleViolation>> {
    let zones = Zones::new(limits)?;
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::invalid_params(format!(
            "plotted value {i} is not finite"
        )));
    }

    let mut selected = rules.to_vec();
    selected.sort();
    selected.dedup();

    let mut violations = Vec::new();
    for rule in selected {
        let found = evaluate_rule(rule, values, &zones);
        if !found.is_empty() {
            trace!(rule = rule.id(), count = found.len(), "run rule fired");
        }
        violations.extend(found.into_iter().map(|points| RuleViolation { rule, points }));
    }
    Ok(violations)
}

/// Evaluate all eight rules.
///
/// # Errors
///
/// Same as [`detect_rules`].
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::{detect_violations, ControlLimits, WesternElectricRule};
///
/// let limits = ControlLimits { ucl: 13.0, cl: 10.0, lcl: 7.0 };
/// let values = [10.0, 10.5, 9.5, 14.0, 10.0];
/// let violations = detect_violations(&values, &limits).unwrap();
///
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].rule, WesternElectricRule::BeyondLimits);
/// assert_eq!(violations[0].points, vec![3]);
/// ```
pub fn detect_violations(values: &[f64], limits: &ControlLimits) -> Result<Vec<RuleViolation>> {
    detect_rules(values, limits, &WesternElectricRule::ALL)
}

/// Remove repeated (rule, point set) pairs, keeping the first occurrence.
#[must_use]
pub fn dedup_violations(violations: Vec<RuleViolation>) -> Vec<RuleViolation> {
    let mut seen = HashSet::new();
    violations
        .into_iter()
        .filter(|v| seen.insert((v.rule, v.points.clone())))
        .collect()
}
