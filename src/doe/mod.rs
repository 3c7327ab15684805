//! DOE (Design of Experiments) analysis module.
//!
//! This module analyses responses attached to a [`DesignMatrix`]:
//! - Main and two-factor interaction effects
//! - ANOVA with F-ratios and p-values when error degrees of freedom remain
//! - Second-order response-surface fitting and stationary-point analysis
//! - Desirability functions and multi-response optimization
//!
//! ## Quick Start
//!
//! ```rust
//! use doe_sqc::DesignBuilder;
//! # #[cfg(feature = "doe")]
//! use doe_sqc::doe::{all_effects, anova};
//!
//! # #[cfg(feature = "doe")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let design = DesignBuilder::new()
//!     .names(&["Temp", "Time"])
//!     .build()?
//!     .with_response("Yield", vec![28.0, 36.0, 18.0, 31.0])?;
//!
//! for effect in all_effects(&design, &[], "Yield")? {
//!     println!("{:<10} {:>8.3}", effect.name, effect.effect);
//! }
//!
//! let table = anova(&design, &[], "Yield")?;
//! println!("R² = {:.4}", table.r_squared);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "doe"))]
//! # fn main() {}
//! ```
//!
//! ## Analysis Types
//!
//! ### Effects
//!
//! An effect is the mean response at the high level minus the mean response
//! at the low level. Interaction effects use the product column of two
//! factors. Terms are ranked by absolute effect.
//!
//! ### ANOVA
//!
//! Each two-level term carries one degree of freedom and sum of squares
//! N·(effect/2)². Whatever the model does not explain is residual error. A
//! saturated design (no error degrees of freedom) reports no F-ratios.
//!
//! ### Response Surfaces
//!
//! A full quadratic model in two factors is fitted by least squares. The
//! stationary point is classified as a maximum, minimum or saddle from the
//! Hessian.
//!
//! [`DesignMatrix`]: crate::design::DesignMatrix

mod anova;
mod desirability;
mod effects;
mod rsm;
mod types;

pub use anova::anova;
pub use desirability::{
    maximize_desirability, minimize_desirability, optimize_desirability, overall_desirability,
    target_desirability, DesirabilityGoal, DesirabilityOptimum, GridConfig, ResponseGoal,
};
pub use effects::{
    all_effects, interaction_effect, main_effect, sum_of_squares_factor,
    sum_of_squares_interaction, sum_of_squares_total,
};
pub use rsm::{
    canonical_eigenvalues, classify_hessian, find_stationary_point, fit_second_order, predict,
    RSM_TERMS,
};
pub use types::{
    ANOVAEntry, ANOVATable, EffectEstimate, EffectKind, RsmCoefficients, RsmModel,
    StationaryKind, StationaryPoint,
};
