//! Process capability indices (Cp, Cpk, Pp, Ppk, Cpm) and defect rates.
//!
//! Capability indices compare the spread of a process with the width of its
//! specification. A single sample standard deviation (n − 1) serves as σ
//! for both the short-term (Cp, Cpk) and long-term (Pp, Ppk) indices, so
//! the two pairs coincide.
//!
//! The expected fraction outside the specification comes from the normal
//! model, using the Abramowitz–Stegun erf approximation (|ε| ≤ 1.5×10⁻⁷).
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Chan, Cheng & Spiring (1988), "A New Measure of Process Capability: Cpm",
//!   *Journal of Quality Technology* 20(3), pp. 162--175.

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::{mean, sample_std_dev, standard_normal_cdf};

/// Specification limits with an optional target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecLimits {
    /// Upper specification limit.
    pub usl: f64,
    /// Lower specification limit.
    pub lsl: f64,
    /// Nominal value; the midpoint of the limits when `None`.
    pub target: Option<f64>,
}

impl SpecLimits {
    /// Two-sided limits without an explicit target.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpecification` unless both limits are finite and
    /// `usl > lsl`.
    pub fn new(usl: f64, lsl: f64) -> Result<Self> {
        let limits = Self {
            usl,
            lsl,
            target: None,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Set the nominal target.
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Target if given, otherwise the midpoint of the limits.
    #[must_use]
    pub fn nominal(&self) -> f64 {
        self.target.unwrap_or((self.usl + self.lsl) / 2.0)
    }

    fn validate(&self) -> Result<()> {
        if !(self.usl.is_finite() && self.lsl.is_finite()) || self.usl <= self.lsl {
            return Err(Error::InvalidSpecification {
                usl: self.usl,
                lsl: self.lsl,
            });
        }
        if self.target.is_some_and(|t| !t.is_finite()) {
            return Err(Error::invalid_params("specification target must be finite"));
        }
        Ok(())
    }
}

/// Capability indices and expected defect rates for one sample.
///
/// | Index | Value | Interpretation |
/// |-------|-------|----------------|
/// | Cp | >= 1.33 | spread fits the specification |
/// | Cpk | >= 1.33 | capable and centered |
/// | Cpm | >= 1.33 | meets the target-loss criterion |
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapabilityReport {
    /// Cp = (USL − LSL) / 6σ.
    pub cp: f64,
    /// Cpk = min(Cpu, Cpl).
    pub cpk: f64,
    /// Cpu = (USL − mean) / 3σ.
    pub cpu: f64,
    /// Cpl = (mean − LSL) / 3σ.
    pub cpl: f64,
    /// Pp, equal to Cp (same σ).
    pub pp: f64,
    /// Ppk, equal to Cpk (same σ).
    pub ppk: f64,
    /// Cpm = Cp / √(1 + ((mean − T)/σ)²).
    pub cpm: f64,
    /// Distance from the mean to USL in σ units.
    pub z_upper: f64,
    /// Distance from the mean to LSL in σ units.
    pub z_lower: f64,
    /// Expected defects per million opportunities.
    pub dpmo: f64,
    /// Expected percentage within specification.
    pub yield_percent: f64,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation (n − 1).
    pub std_dev: f64,
    /// Number of observations.
    pub n: usize,
    /// Specification used.
    pub spec: SpecLimits,
}

/// Compute capability indices for `data` against `spec`.
///
/// # Errors
///
/// - `InvalidSpecification` if `usl <= lsl` or a limit is non-finite
/// - `InsufficientData` with fewer than 2 observations
/// - `NonFiniteResult` if the standard deviation is zero or not finite
///
/// # Example
///
/// ```
/// use doe_sqc::sqc::{process_capability, SpecLimits};
///
/// let spec = SpecLimits::new(11.0, 9.0).unwrap();
/// let data = [9.5, 10.0, 10.2, 9.8, 10.1, 10.3, 9.9, 10.0];
/// let report = process_capability(&data, &spec).unwrap();
///
/// assert!(report.cp > 1.0);
/// assert!(report.cpk <= report.cp);
/// assert_eq!(report.pp, report.cp);
/// ```
pub fn process_capability(data: &[f64], spec: &SpecLimits) -> Result<CapabilityReport> {
    spec.validate()?;
    if data.len() < 2 {
        return Err(Error::insufficient("process capability", 2, data.len()));
    }

    let m = mean(data).ok_or(Error::EmptyDataset)?;
    let sigma = sample_std_dev(data).ok_or(Error::EmptyDataset)?;
    if !(sigma.is_finite() && sigma > 0.0) || !m.is_finite() {
        return Err(Error::NonFiniteResult {
            statistic: "standard deviation",
        });
    }

    let cp = (spec.usl - spec.lsl) / (6.0 * sigma);
    let cpu = (spec.usl - m) / (3.0 * sigma);
    let cpl = (m - spec.lsl) / (3.0 * sigma);
    let cpk = cpu.min(cpl);

    let offset = (m - spec.nominal()) / sigma;
    let cpm = cp / (1.0 + offset * offset).sqrt();

    let z_upper = (spec.usl - m) / sigma;
    let z_lower = (m - spec.lsl) / sigma;
    let p_out = standard_normal_cdf(-z_upper) + standard_normal_cdf(-z_lower);
    let dpmo = p_out * 1e6;
    let yield_percent = 100.0 * (1.0 - p_out);

    debug!(n = data.len(), mean = m, sigma, cp, cpk, "computed process capability");

    Ok(CapabilityReport {
        cp,
        cpk,
        cpu,
        cpl,
        pp: cp,
        ppk: cpk,
        cpm,
        z_upper,
        z_lower,
        dpmo,
        yield_percent,
        mean: m,
        std_dev: sigma,
        n: data.len(),
        spec: *spec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_centered_process() {
        // mean 10, sample std 1
        let data = [9.0, 11.0, 9.0, 11.0, 10.0 - 2.0_f64.sqrt() / 2.0, 10.0 + 2.0_f64.sqrt() / 2.0];
        let spec = SpecLimits::new(13.0, 7.0).unwrap();
        let r = process_capability(&data, &spec).unwrap();

        assert!((r.mean - 10.0).abs() < 1e-12);
        let s = r.std_dev;
        assert!((r.cp - 6.0 / (6.0 * s)).abs() < 1e-12);
        assert!((r.cpu - r.cpl).abs() < 1e-12);
        assert!((r.cpk - r.cp).abs() < 1e-12);
        assert!((r.cpm - r.cp).abs() < 1e-12);
        assert!((r.z_upper - r.z_lower).abs() < 1e-12);
        assert!((r.yield_percent + r.dpmo / 1e4 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_sigma_dpmo() {
        // Limits at ±3 sample standard deviations around a zero mean
        let data = [-1.0, 1.0];
        let sd = sample_std_dev(&data).unwrap();
        let spec = SpecLimits::new(3.0 * sd, -3.0 * sd).unwrap();
        let r = process_capability(&data, &spec).unwrap();
        assert!((r.cp - 1.0).abs() < 1e-12);
        // Two-sided 3σ tail ≈ 2700 ppm
        assert!((r.dpmo - 2699.8).abs() < 1.0);
    }

    #[test]
    fn test_off_center_with_target() {
        let data = [10.5, 10.7, 10.6, 10.4, 10.8];
        let spec = SpecLimits::new(11.0, 9.0).unwrap().with_target(10.0);
        let r = process_capability(&data, &spec).unwrap();
        assert!(r.cpk < r.cp);
        assert!((r.cpk - r.cpu).abs() < 1e-12);
        assert!(r.cpm < r.cp);
        assert_eq!(r.ppk, r.cpk);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            SpecLimits::new(9.0, 11.0),
            Err(Error::InvalidSpecification { .. })
        ));
        let bad = SpecLimits {
            usl: 5.0,
            lsl: 5.0,
            target: None,
        };
        assert!(matches!(
            process_capability(&[1.0, 2.0], &bad),
            Err(Error::InvalidSpecification { .. })
        ));

        let spec = SpecLimits::new(11.0, 9.0).unwrap();
        assert!(matches!(
            process_capability(&[10.0], &spec),
            Err(Error::InsufficientData { .. })
        ));
        assert!(matches!(
            process_capability(&[10.0, 10.0, 10.0], &spec),
            Err(Error::NonFiniteResult { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_cpk_never_exceeds_cp(
            data in proptest::collection::vec(0.0f64..100.0, 2..50),
            lsl in -50.0f64..50.0,
            width in 1.0f64..200.0,
        ) {
            let spec = SpecLimits::new(lsl + width, lsl).unwrap();
            if let Ok(r) = process_capability(&data, &spec) {
                prop_assert!(r.cpk <= r.cp + 1e-12);
                prop_assert!(r.cpm <= r.cp + 1e-12);
                // The two tails are disjoint, up to the erf approximation error
                prop_assert!(r.yield_percent <= 100.0 + 1e-9);
                prop_assert!(r.yield_percent >= -1e-4);
            }
        }
    }
}
