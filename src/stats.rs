//! Statistical utilities shared by the DOE and SQC modules.
//!
//! Provides:
//! - Descriptive statistics (mean, sample variance, range)
//! - Standard normal CDF (Abramowitz–Stegun rational approximation)
//! - Log gamma function (Lanczos approximation)
//! - Regularized incomplete beta function
//! - F-distribution p-value calculation

use std::f64::consts::{PI, SQRT_2};

/// Arithmetic mean, or `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with the `n - 1` denominator, or `None` for fewer than two values.
///
/// Uses the two-pass algorithm: the mean is computed first and the squared
/// deviations are summed afterwards.
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation (`n - 1` denominator).
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Range (max - min), or `None` for an empty slice.
#[must_use]
pub fn range(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(max - min)
}

/// Error function, Abramowitz & Stegun formula 7.1.26.
///
/// Maximum absolute error is 1.5e-7.
#[must_use]
pub fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function Φ(z).
///
/// # Example
///
/// ```
/// use doe_sqc::stats::standard_normal_cdf;
///
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-4);
/// ```
#[must_use]
pub fn standard_normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    (0.5 * (1.0 + erf(z / SQRT_2))).clamp(0.0, 1.0)
}

/// Log gamma function using Lanczos approximation.
///
/// # Arguments
/// * `x` - Input value (must be positive)
///
/// # Returns
/// * ln(Gamma(x)), or infinity for non-positive input
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }

    // Lanczos approximation coefficients (g=7)
    const G: f64 = 7.0;
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    let x = x - 1.0;
    let sum = COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFICIENTS[0], |acc, (i, &c)| acc + c / (x + i as f64));

    let t = x + G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b).
///
/// Uses the continued fraction expansion (modified Lentz).
#[must_use]
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    const TINY: f64 = 1e-30;
    const TOLERANCE: f64 = 1e-12;
    const MAX_ITERATIONS: usize = 300;

    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // Symmetry relation keeps the continued fraction in its fast-converging region
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
    }

    let ln_beta = ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b);
    let front = (x.ln() * a + (1.0 - x).ln() * b - ln_beta).exp() / a;

    let mut c = 1.0;
    let mut d = 1.0 - (a + b) * x / (a + 1.0);
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut f = d;

    for m in 1..=MAX_ITERATIONS {
        let m_f = m as f64;

        // Even step
        let numerator = m_f * (b - m_f) * x / ((a + 2.0 * m_f - 1.0) * (a + 2.0 * m_f));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        f *= d * c;

        // Odd step
        let numerator = -(a + m_f) * (a + b + m_f) * x / ((a + 2.0 * m_f) * (a + 2.0 * m_f + 1.0));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        f *= delta;

        if (delta - 1.0).abs() < TOLERANCE {
            break;
        }
    }

    front * f
}

/// Calculate p-value from F-distribution.
///
/// Returns P(F > f) for the F-distribution with df1 and df2 degrees of freedom.
#[must_use]
pub fn f_distribution_p_value(f: f64, df1: usize, df2: usize) -> f64 {
    if f <= 0.0 || df1 == 0 || df2 == 0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }

    // P(F > f) = I_x(df2/2, df1/2) where x = df2/(df2 + df1*f)
    let x = df2 as f64 / (df2 as f64 + df1 as f64 * f);
    regularized_incomplete_beta(x, df2 as f64 / 2.0, df1 as f64 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptive() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data).unwrap() - 5.0).abs() < 1e-12);
        // Sum of squared deviations = 32, n - 1 = 7
        assert!((sample_variance(&data).unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert!((range(&data).unwrap() - 7.0).abs() < 1e-12);

        assert!(mean(&[]).is_none());
        assert!(sample_variance(&[1.0]).is_none());
        assert!(range(&[]).is_none());
    }

    #[test]
    fn test_normal_cdf_known_values() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((standard_normal_cdf(1.0) - 0.841_344_746).abs() < 2e-7);
        assert!((standard_normal_cdf(-1.0) - 0.158_655_254).abs() < 2e-7);
        assert!((standard_normal_cdf(3.0) - 0.998_650_102).abs() < 2e-7);
        assert!(standard_normal_cdf(-10.0) < 1e-7);
        assert!(standard_normal_cdf(10.0) > 1.0 - 1e-7);
    }

    #[test]
    fn test_normal_cdf_symmetry() {
        for &z in &[0.3, 1.2, 2.5, 4.0] {
            let sum = standard_normal_cdf(z) + standard_normal_cdf(-z);
            assert!((sum - 1.0).abs() < 1e-7);
        }
    }

    #[test]
    fn test_ln_gamma_known_values() {
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!(ln_gamma(2.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - 0.5 * PI.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_incomplete_beta_bounds_and_symmetry() {
        assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
        assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);

        let x = 0.3;
        let result =
            regularized_incomplete_beta(x, 2.0, 3.0) + regularized_incomplete_beta(1.0 - x, 3.0, 2.0);
        assert!((result - 1.0).abs() < 1e-8);

        // I_x(1, 1) = x
        assert!((regularized_incomplete_beta(0.37, 1.0, 1.0) - 0.37).abs() < 1e-8);
    }

    #[test]
    fn test_f_distribution_p_value() {
        assert!((f_distribution_p_value(0.0, 3, 10) - 1.0).abs() < 1e-10);
        assert!(f_distribution_p_value(100.0, 3, 10) < 0.001);

        // F(1, 10) critical value at alpha = 0.05 is 4.965
        let p = f_distribution_p_value(4.965, 1, 10);
        assert!((p - 0.05).abs() < 0.002, "got {p}");

        let p_low = f_distribution_p_value(2.0, 1, 10);
        let p_high = f_distribution_p_value(8.0, 1, 10);
        assert!(p_low > p && p > p_high);
    }
}
