//! DOE analysis types.
//!
//! Result records for effect estimation, ANOVA and response-surface fitting.

use std::fmt::{self, Write};

/// Kind of model term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Effect of a single factor.
    Main,
    /// Two-factor interaction.
    Interaction,
}

/// Estimated effect of one model term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectEstimate {
    /// Term name: the factor name, or `"A:B"` for an interaction.
    pub name: String,
    /// Factors participating in the term, in design order.
    pub factors: Vec<String>,
    /// Main effect or interaction.
    pub kind: EffectKind,
    /// Effect: mean response at +1 minus mean response at −1.
    pub effect: f64,
    /// Regression coefficient in coded units (effect / 2).
    pub coefficient: f64,
    /// Rank by absolute effect (1 = largest).
    pub rank: usize,
}

/// ANOVA table entry for a single model term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ANOVAEntry {
    /// Source (term) name.
    pub source: String,
    /// Main effect or interaction.
    pub kind: EffectKind,
    /// Sum of squares for this term, N·(effect/2)².
    pub sum_of_squares: f64,
    /// Degrees of freedom (1 for two-level terms).
    pub degrees_of_freedom: usize,
    /// Mean square (SS / df).
    pub mean_square: f64,
    /// F-ratio (MS_term / MSE), `None` without error degrees of freedom.
    pub f_ratio: Option<f64>,
    /// P-value from the F-distribution, `None` without error degrees of freedom.
    pub p_value: Option<f64>,
    /// Percent contribution to the total sum of squares.
    pub contribution_percent: f64,
}

/// Complete ANOVA table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ANOVATable {
    /// One entry per main effect, then per two-factor interaction.
    pub entries: Vec<ANOVAEntry>,
    /// Total sum of squares, Σ(y − ȳ)².
    pub ss_total: f64,
    /// Model sum of squares (sum over entries).
    pub ss_model: f64,
    /// Error sum of squares, SST − SSModel clamped at zero.
    pub ss_error: f64,
    /// Model degrees of freedom (number of terms).
    pub df_model: usize,
    /// Error degrees of freedom, N − df_model − 1.
    pub df_error: usize,
    /// Total degrees of freedom, N − 1.
    pub df_total: usize,
    /// Error mean square; `None` for a saturated design (no error df).
    pub ms_error: Option<f64>,
    /// Coefficient of determination, 1 − SSE/SST.
    pub r_squared: f64,
    /// Adjusted R²; `None` for a saturated design.
    pub adj_r_squared: Option<f64>,
}

impl ANOVATable {
    /// Look up an entry by source name.
    #[must_use]
    pub fn entry(&self, source: &str) -> Option<&ANOVAEntry> {
        self.entries.iter().find(|e| e.source == source)
    }

    /// Whether the design left no degrees of freedom for error.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.df_error == 0
    }
}

/// Coefficients of the two-factor second-order model
/// `y = b0 + b1·x1 + b2·x2 + b11·x1² + b22·x2² + b12·x1·x2`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RsmCoefficients {
    /// Intercept.
    pub b0: f64,
    /// Linear coefficient of x1.
    pub b1: f64,
    /// Linear coefficient of x2.
    pub b2: f64,
    /// Quadratic coefficient of x1².
    pub b11: f64,
    /// Quadratic coefficient of x2².
    pub b22: f64,
    /// Interaction coefficient of x1·x2.
    pub b12: f64,
}

impl RsmCoefficients {
    /// Human-readable equation using the given factor names.
    #[must_use]
    pub fn equation(&self, x1: &str, x2: &str) -> String {
        let terms = [
            (self.b1, x1.to_string()),
            (self.b2, x2.to_string()),
            (self.b11, format!("{x1}²")),
            (self.b22, format!("{x2}²")),
            (self.b12, format!("{x1}·{x2}")),
        ];
        let mut eq = format!("y = {:.4}", self.b0);
        for (coef, name) in terms {
            let sign = if coef < 0.0 { '-' } else { '+' };
            let _ = write!(eq, " {sign} {:.4}·{name}", coef.abs());
        }
        eq
    }
}

impl fmt::Display for RsmCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.equation("x1", "x2"))
    }
}

/// A fitted second-order response-surface model in two coded factors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RsmModel {
    /// Fitted coefficients.
    pub coefficients: RsmCoefficients,
    /// The two factor names, in (x1, x2) order.
    pub factors: [String; 2],
    /// Display equation.
    pub equation: String,
    /// R² of the least-squares fit.
    pub r_squared: f64,
    /// Number of runs used in the fit.
    pub runs: usize,
}

impl RsmModel {
    /// Predicted response at coded settings `(x1, x2)`.
    #[must_use]
    pub fn predict(&self, x1: f64, x2: f64) -> f64 {
        super::rsm::predict(&self.coefficients, x1, x2)
    }
}

/// Nature of a stationary point of the fitted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationaryKind {
    /// Both Hessian eigenvalues negative.
    Maximum,
    /// Both Hessian eigenvalues positive.
    Minimum,
    /// Eigenvalues of mixed sign.
    Saddle,
    /// Singular Hessian (a ridge system).
    Degenerate,
}

impl fmt::Display for StationaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Maximum => "maximum",
            Self::Minimum => "minimum",
            Self::Saddle => "saddle",
            Self::Degenerate => "degenerate",
        };
        f.write_str(name)
    }
}

/// Stationary point of a second-order surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationaryPoint {
    /// Coded x1 coordinate.
    pub x1: f64,
    /// Coded x2 coordinate.
    pub x2: f64,
    /// Predicted response at the point.
    pub predicted: f64,
    /// Classification from the Hessian.
    pub kind: StationaryKind,
}
