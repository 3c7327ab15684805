//! Conversion between physical factor settings and coded levels.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn check_step(center: f64, step: f64) -> Result<()> {
    if !center.is_finite() || !step.is_finite() {
        return Err(Error::invalid_params("center and step must be finite"));
    }
    if step == 0.0 {
        return Err(Error::invalid_params("step must be nonzero"));
    }
    Ok(())
}

/// Convert a physical value to coded units: `(actual - center) / step`.
///
/// # Errors
///
/// Returns `InvalidParams` if `step` is zero or any argument is not finite.
///
/// # Example
///
/// ```
/// use doe_sqc::design::{code, decode};
///
/// assert_eq!(code(175.0, 150.0, 25.0).unwrap(), 1.0);
/// assert_eq!(decode(-1.0, 150.0, 25.0).unwrap(), 125.0);
/// ```
pub fn code(actual: f64, center: f64, step: f64) -> Result<f64> {
    check_step(center, step)?;
    if !actual.is_finite() {
        return Err(Error::invalid_params("value must be finite"));
    }
    Ok((actual - center) / step)
}

/// Convert a coded level back to physical units: `center + coded * step`.
///
/// # Errors
///
/// Returns `InvalidParams` if `step` is zero or any argument is not finite.
pub fn decode(coded: f64, center: f64, step: f64) -> Result<f64> {
    check_step(center, step)?;
    if !coded.is_finite() {
        return Err(Error::invalid_params("value must be finite"));
    }
    Ok(center + coded * step)
}

/// Physical range of a factor, mapped to coded −1 (low) and +1 (high).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactorRange {
    low: f64,
    high: f64,
}

impl FactorRange {
    /// Create a range from the physical low and high settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` if the bounds are not finite or `high <= low`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::invalid_params("factor range bounds must be finite"));
        }
        if high <= low {
            return Err(Error::invalid_params(format!(
                "factor range high {high} must exceed low {low}"
            )));
        }
        Ok(Self { low, high })
    }

    /// Physical setting at coded −1.
    #[must_use]
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Physical setting at coded +1.
    #[must_use]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Physical setting at coded 0.
    #[must_use]
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Physical distance of one coded unit.
    #[must_use]
    pub fn step(&self) -> f64 {
        (self.high - self.low) / 2.0
    }

    /// Convert a physical value to coded units.
    #[must_use]
    pub fn code(&self, actual: f64) -> f64 {
        (actual - self.center()) / self.step()
    }

    /// Convert a coded level to physical units.
    #[must_use]
    pub fn decode(&self, coded: f64) -> f64 {
        self.center() + coded * self.step()
    }
}
