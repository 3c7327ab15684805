//! Main and interaction effect estimation for two-level designs.
//!
//! An effect is the difference between the mean response at the high (+1)
//! and low (−1) setting of a contrast column. Only runs sitting exactly at
//! ±1 in coded units participate, so axial and center runs of a
//! central-composite design are ignored here.

use tracing::trace;

use super::types::{EffectEstimate, EffectKind};
use crate::design::{DesignMatrix, LEVEL_TOLERANCE};
use crate::error::{Error, Result};

fn is_high(level: f64) -> bool {
    (level - 1.0).abs() <= LEVEL_TOLERANCE
}

fn is_low(level: f64) -> bool {
    (level + 1.0).abs() <= LEVEL_TOLERANCE
}

/// Mean at +1 minus mean at −1 over `(contrast, response)` pairs.
fn contrast_effect(pairs: impl Iterator<Item = (f64, f64)>) -> Result<f64> {
    let (mut sum_hi, mut n_hi) = (0.0, 0usize);
    let (mut sum_lo, mut n_lo) = (0.0, 0usize);

    for (level, y) in pairs {
        if is_high(level) {
            sum_hi += y;
            n_hi += 1;
        } else if is_low(level) {
            sum_lo += y;
            n_lo += 1;
        }
    }

    if n_hi == 0 || n_lo == 0 {
        return Err(Error::insufficient(
            "effect estimation (runs at both -1 and +1)",
            2,
            n_hi + n_lo,
        ));
    }

    let effect = sum_hi / n_hi as f64 - sum_lo / n_lo as f64;
    if !effect.is_finite() {
        return Err(Error::NonFiniteResult { statistic: "effect" });
    }
    Ok(effect)
}

fn response_for<'a>(design: &'a DesignMatrix, response: &str) -> Result<&'a [f64]> {
    if design.runs() == 0 {
        return Err(Error::EmptyDataset);
    }
    design.response(response)
}

/// Main effect of `factor` on `response`.
///
/// # Errors
///
/// - `EmptyDataset` if the design has no runs
/// - `UnknownFactor` / `UnknownResponse` for names not in the design
/// - `InsufficientData` if no run sits at one of the two levels
///
/// # Example
///
/// ```
/// use doe_sqc::design::full_factorial;
/// use doe_sqc::doe::main_effect;
///
/// let design = full_factorial(2, &[])
///     .unwrap()
///     .with_response("Y", vec![28.0, 36.0, 18.0, 31.0])
///     .unwrap();
///
/// assert!((main_effect(&design, "X1", "Y").unwrap() - 10.5).abs() < 1e-12);
/// ```
pub fn main_effect(design: &DesignMatrix, factor: &str, response: &str) -> Result<f64> {
    let y = response_for(design, response)?;
    let column = design.column(factor)?;
    contrast_effect(column.iter().copied().zip(y.iter().copied()))
}

/// Two-factor interaction effect of `f1` and `f2` on `response`.
///
/// The product column `x_f1 · x_f2` is treated as a synthetic factor over the
/// runs where both factors sit at ±1. The result is symmetric in `f1`/`f2`.
///
/// # Errors
///
/// Same as [`main_effect`], plus `InvalidParams` when `f1 == f2`.
pub fn interaction_effect(
    design: &DesignMatrix,
    f1: &str,
    f2: &str,
    response: &str,
) -> Result<f64> {
    if f1 == f2 {
        return Err(Error::invalid_params(format!(
            "interaction requires two distinct factors, got '{f1}' twice"
        )));
    }
    let y = response_for(design, response)?;
    let a = design.column(f1)?;
    let b = design.column(f2)?;

    let pairs = a
        .iter()
        .zip(b.iter())
        .zip(y.iter())
        .map(|((&xa, &xb), &yv)| {
            let on_corner = (is_high(xa) || is_low(xa)) && (is_high(xb) || is_low(xb));
            let product = if on_corner { xa * xb } else { 0.0 };
            (product, yv)
        });
    contrast_effect(pairs)
}

/// Main effects for every factor, then two-factor interactions for every
/// unordered pair.
///
/// An empty `factors` slice selects every factor of the design, in design
/// order. Ranks are assigned by absolute effect (1 = largest).
///
/// # Errors
///
/// Propagates the errors of [`main_effect`] and [`interaction_effect`].
pub fn all_effects(
    design: &DesignMatrix,
    factors: &[&str],
    response: &str,
) -> Result<Vec<EffectEstimate>> {
    let names: Vec<&str> = if factors.is_empty() {
        design.factor_names().iter().map(String::as_str).collect()
    } else {
        factors.to_vec()
    };

    let mut effects = Vec::with_capacity(names.len() * (names.len() + 1) / 2);

    for &name in &names {
        let effect = main_effect(design, name, response)?;
        effects.push(EffectEstimate {
            name: name.to_string(),
            factors: vec![name.to_string()],
            kind: EffectKind::Main,
            effect,
            coefficient: effect / 2.0,
            rank: 0,
        });
    }

    for (i, &a) in names.iter().enumerate() {
        for &b in &names[i + 1..] {
            let effect = interaction_effect(design, a, b, response)?;
            effects.push(EffectEstimate {
                name: format!("{a}:{b}"),
                factors: vec![a.to_string(), b.to_string()],
                kind: EffectKind::Interaction,
                effect,
                coefficient: effect / 2.0,
                rank: 0,
            });
        }
    }

    // Rank terms by |effect| (larger = more important = lower rank)
    let mut order: Vec<(usize, f64)> = effects
        .iter()
        .enumerate()
        .map(|(i, e)| (i, e.effect.abs()))
        .collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (rank, (idx, _)) in order.iter().enumerate() {
        effects[*idx].rank = rank + 1;
    }

    trace!(terms = effects.len(), response, "estimated effects");
    Ok(effects)
}

/// Total sum of squares Σ(y − ȳ)².
///
/// # Errors
///
/// Returns `EmptyDataset` for an empty slice.
pub fn sum_of_squares_total(responses: &[f64]) -> Result<f64> {
    let mean = crate::stats::mean(responses).ok_or(Error::EmptyDataset)?;
    Ok(responses.iter().map(|y| (y - mean).powi(2)).sum())
}

/// Sum of squares for a two-level term: N·(effect/2)².
fn term_sum_of_squares(runs: usize, effect: f64) -> f64 {
    runs as f64 * (effect / 2.0).powi(2)
}

/// Sum of squares of a main effect, N·(effect/2)².
///
/// # Errors
///
/// Propagates the errors of [`main_effect`].
pub fn sum_of_squares_factor(design: &DesignMatrix, factor: &str, response: &str) -> Result<f64> {
    let effect = main_effect(design, factor, response)?;
    Ok(term_sum_of_squares(design.runs(), effect))
}

/// Sum of squares of a two-factor interaction, N·(effect/2)².
///
/// # Errors
///
/// Propagates the errors of [`interaction_effect`].
pub fn sum_of_squares_interaction(
    design: &DesignMatrix,
    f1: &str,
    f2: &str,
    response: &str,
) -> Result<f64> {
    let effect = interaction_effect(design, f1, f2, response)?;
    Ok(term_sum_of_squares(design.runs(), effect))
}

pub(crate) fn effect_sum_of_squares(runs: usize, estimate: &EffectEstimate) -> f64 {
    term_sum_of_squares(runs, estimate.effect)
}
