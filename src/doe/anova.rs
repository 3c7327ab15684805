//! ANOVA (Analysis of Variance) for two-level designs.
//!
//! Decomposes the total variation of a response into one sum of squares per
//! main effect and two-factor interaction, plus a residual error term.
//! F-ratios and p-values are reported when the design leaves error degrees
//! of freedom.

use tracing::debug;

use super::effects::{all_effects, effect_sum_of_squares, sum_of_squares_total};
use super::types::{ANOVAEntry, ANOVATable};
use crate::design::DesignMatrix;
use crate::error::{Error, Result};
use crate::stats::f_distribution_p_value;

/// Calculate the ANOVA table for `response` over main effects and
/// two-factor interactions of `factors`.
///
/// An empty `factors` slice selects every factor of the design.
///
/// # Algorithm
/// 1. Total SS = Σ(yᵢ − ȳ)²
/// 2. Term SS = N·(effect/2)², one degree of freedom each
/// 3. Error SS = Total − Σ Term SS, clamped at zero
/// 4. Error df = N − df_model − 1; MSE only when error df > 0
/// 5. F = MS_term / MSE and p-values from F(1, df_error) when MSE > 0
///
/// # Errors
///
/// - `EmptyDataset` if the design has no runs
/// - `InsufficientData` if N < df_model + 1
/// - `NonFiniteResult` if the total sum of squares is zero or not finite
/// - any error of [`all_effects`]
///
/// # Example
///
/// ```
/// use doe_sqc::design::full_factorial;
/// use doe_sqc::doe::anova;
///
/// let design = full_factorial(2, &[])
///     .unwrap()
///     .with_response("Y", vec![28.0, 36.0, 18.0, 31.0])
///     .unwrap();
///
/// let table = anova(&design, &["X1", "X2"], "Y").unwrap();
/// assert!((table.ss_total - 172.75).abs() < 1e-9);
/// assert!(table.is_saturated());
/// ```
pub fn anova(design: &DesignMatrix, factors: &[&str], response: &str) -> Result<ANOVATable> {
    let num_runs = design.runs();
    if num_runs == 0 {
        return Err(Error::EmptyDataset);
    }

    let k = if factors.is_empty() {
        design.factors()
    } else {
        factors.len()
    };
    let df_model = k + k * k.saturating_sub(1) / 2;
    if num_runs < df_model + 1 {
        return Err(Error::insufficient(
            "anova (runs >= model terms + 1)",
            df_model + 1,
            num_runs,
        ));
    }

    let effects = all_effects(design, factors, response)?;

    // Total Sum of Squares
    let ss_total = sum_of_squares_total(design.response(response)?)?;
    if !ss_total.is_finite() || ss_total <= 0.0 {
        return Err(Error::NonFiniteResult {
            statistic: "total sum of squares",
        });
    }
    let df_total = num_runs - 1;

    let term_ss: Vec<f64> = effects
        .iter()
        .map(|e| effect_sum_of_squares(num_runs, e))
        .collect();
    let ss_model: f64 = term_ss.iter().sum();

    // Residual error (Total - Model)
    let ss_error = (ss_total - ss_model).max(0.0);
    let df_error = num_runs - df_model - 1;
    let ms_error = (df_error > 0).then(|| ss_error / df_error as f64);

    let entries: Vec<ANOVAEntry> = effects
        .iter()
        .zip(&term_ss)
        .map(|(effect, &ss)| {
            let f_ratio = ms_error.filter(|&mse| mse > 0.0).map(|mse| ss / mse);
            let p_value = f_ratio.map(|f| f_distribution_p_value(f, 1, df_error));
            ANOVAEntry {
                source: effect.name.clone(),
                kind: effect.kind,
                sum_of_squares: ss,
                degrees_of_freedom: 1,
                mean_square: ss,
                f_ratio,
                p_value,
                contribution_percent: ss / ss_total * 100.0,
            }
        })
        .collect();

    let r_squared = (1.0 - ss_error / ss_total).clamp(0.0, 1.0);
    let adj_r_squared = (df_error > 0)
        .then(|| 1.0 - (ss_error / df_error as f64) / (ss_total / df_total as f64));

    debug!(
        response,
        terms = df_model,
        df_error,
        r_squared,
        "computed anova table"
    );

    Ok(ANOVATable {
        entries,
        ss_total,
        ss_model,
        ss_error,
        df_model,
        df_error,
        df_total,
        ms_error,
        r_squared,
        adj_r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::full_factorial;

    fn textbook() -> DesignMatrix {
        full_factorial(2, &[])
            .unwrap()
            .with_response("Y", vec![28.0, 36.0, 18.0, 31.0])
            .unwrap()
    }

    #[test]
    fn test_anova_saturated_textbook() {
        let table = anova(&textbook(), &["X1", "X2"], "Y").unwrap();

        assert_eq!(table.entries.len(), 3);
        assert_eq!(table.df_model, 3);
        assert_eq!(table.df_error, 0);
        assert_eq!(table.df_total, 3);
        assert!(table.is_saturated());
        assert!(table.ms_error.is_none());
        assert!(table.adj_r_squared.is_none());

        assert!((table.ss_total - 172.75).abs() < 1e-9);
        assert!((table.ss_model - 172.75).abs() < 1e-9);
        assert!(table.ss_error.abs() < 1e-9);
        assert!((table.r_squared - 1.0).abs() < 1e-9);

        let x1 = table.entry("X1").unwrap();
        assert!((x1.sum_of_squares - 110.25).abs() < 1e-9);
        assert!(x1.f_ratio.is_none());
        assert!(x1.p_value.is_none());
        let total_pct: f64 = table.entries.iter().map(|e| e.contribution_percent).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
        assert!(table.entry("X1:X2").is_some());
    }

    #[test]
    fn test_anova_with_error_df() {
        // 2^3 with Y = 10 + 3·A + noise-like pattern; 6 terms, 1 error df
        let design = full_factorial(3, &["A", "B", "C"])
            .unwrap()
            .with_response("Y", vec![7.1, 13.0, 6.8, 13.2, 7.0, 12.9, 7.2, 12.8])
            .unwrap();
        let table = anova(&design, &[], "Y").unwrap();

        assert_eq!(table.df_model, 6);
        assert_eq!(table.df_error, 1);
        // Residual is the ABC contrast: -0.8, so SSE = 0.64 / 8
        assert!(table.ms_error.is_some());
        let mse = table.ms_error.unwrap();
        assert!((mse - 0.08).abs() < 1e-9);

        let sum = table.ss_model + table.ss_error;
        assert!((sum - table.ss_total).abs() < 1e-9);

        // A contrast 23.8: SS = 23.8² / 8 = 70.805, F = 70.805 / 0.08 = 29.75²
        let a = table.entry("A").unwrap();
        assert!(a.contribution_percent > 95.0);
        assert!((a.sum_of_squares - 70.805).abs() < 1e-9);
        let f = a.f_ratio.unwrap();
        assert!((f - 885.0625).abs() < 1e-6);

        // F(1, 1) is the square of a Cauchy variable: P(F > t²) = (2/π)·atan(1/t)
        let expected_p = 2.0 / std::f64::consts::PI * (1.0 / 29.75_f64).atan();
        let p = a.p_value.unwrap();
        assert!((p - expected_p).abs() < 1e-6);
        assert!((p - 0.021_390_9).abs() < 1e-6);
        assert!(table.r_squared > 0.99 && table.r_squared <= 1.0);
    }

    #[test]
    fn test_anova_errors() {
        // Constant response
        let flat = full_factorial(2, &[])
            .unwrap()
            .with_response("Y", vec![5.0; 4])
            .unwrap();
        assert!(matches!(
            anova(&flat, &[], "Y"),
            Err(Error::NonFiniteResult { .. })
        ));

        // Three factors give 6 terms, so 7 runs are needed
        let tiny = DesignMatrix::from_rows(
            &["A", "B", "C"],
            &[
                vec![-1.0, -1.0, -1.0],
                vec![1.0, 1.0, 1.0],
                vec![-1.0, 1.0, -1.0],
                vec![1.0, -1.0, 1.0],
            ],
        )
        .unwrap()
        .with_response("Y", vec![1.0, 2.0, 3.0, 4.0])
        .unwrap();
        assert!(matches!(
            anova(&tiny, &[], "Y"),
            Err(Error::InsufficientData { .. })
        ));

        assert!(matches!(
            anova(&textbook(), &["X1", "Q"], "Y"),
            Err(Error::UnknownFactor(_))
        ));
    }
}
