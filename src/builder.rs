//! Builder pattern for generating experimental designs.
//!
//! The builder provides one entry point for both design families without
//! the caller having to assemble config structs by hand.
//!
//! # Example
//!
//! ```
//! use doe_sqc::{CcdType, DesignBuilder};
//!
//! // Two-level full factorial
//! let design = DesignBuilder::new().factors(3).build().unwrap();
//! assert_eq!(design.runs(), 8);
//!
//! // Faced central composite with 2 center runs
//! let design = DesignBuilder::new()
//!     .names(&["Temp", "Time"])
//!     .central_composite(CcdType::Faced)
//!     .center_points(2)
//!     .build()
//!     .unwrap();
//! assert_eq!(design.runs(), 4 + 4 + 2);
//! ```

use crate::design::{
    central_composite, full_factorial, CcdConfig, CcdType, CentralComposite, DesignMatrix,
};
use crate::error::{Error, Result};

/// Design family selected on the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Family {
    #[default]
    FullFactorial,
    CentralComposite(CcdType),
}

/// Builder for experimental designs.
///
/// Defaults to a two-level full factorial. Calling
/// [`central_composite`](DesignBuilder::central_composite) switches to a CCD.
#[derive(Debug, Clone, Default)]
pub struct DesignBuilder {
    factors: Option<usize>,
    names: Option<Vec<String>>,
    family: Family,
    center_points: Option<usize>,
}

impl DesignBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of factors.
    ///
    /// May be omitted when [`names`](DesignBuilder::names) is given.
    #[must_use]
    pub fn factors(mut self, factors: usize) -> Self {
        self.factors = Some(factors);
        self
    }

    /// Set the factor names, in column order.
    #[must_use]
    pub fn names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|s| (*s).to_string()).collect());
        self
    }

    /// Generate a central-composite design of the given type.
    #[must_use]
    pub fn central_composite(mut self, ccd_type: CcdType) -> Self {
        self.family = Family::CentralComposite(ccd_type);
        self
    }

    /// Set the number of center runs for a central-composite design (default 3).
    #[must_use]
    pub fn center_points(mut self, center_points: usize) -> Self {
        self.center_points = Some(center_points);
        self
    }

    fn resolve_factors(&self) -> Result<usize> {
        match (self.factors, self.names.as_ref()) {
            (Some(k), _) => Ok(k),
            (None, Some(names)) => Ok(names.len()),
            (None, None) => Err(Error::invalid_params(
                "factors or names must be specified",
            )),
        }
    }

    /// Build the central-composite design together with its run breakdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder is not configured for a CCD or the
    /// generator rejects the parameters.
    pub fn build_ccd(self) -> Result<CentralComposite> {
        let ccd_type = match self.family {
            Family::CentralComposite(t) => t,
            Family::FullFactorial => {
                return Err(Error::invalid_params(
                    "builder is not configured for a central composite design",
                ))
            }
        };
        let k = self.resolve_factors()?;
        let defaults = CcdConfig::default();
        let config = CcdConfig {
            ccd_type,
            center_points: self.center_points.unwrap_or(defaults.center_points),
            factor_names: self.names.unwrap_or_default(),
        };
        central_composite(k, &config)
    }

    /// Build the design.
    ///
    /// # Errors
    ///
    /// Returns an error if neither factors nor names are specified, if
    /// center points are requested for a factorial design, or if the
    /// generator rejects the parameters.
    pub fn build(self) -> Result<DesignMatrix> {
        match self.family {
            Family::FullFactorial => {
                if self.center_points.is_some() {
                    return Err(Error::invalid_params(
                        "center points require a central composite design",
                    ));
                }
                let k = self.resolve_factors()?;
                let names: Vec<&str> = self
                    .names
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(String::as_str)
                    .collect();
                full_factorial(k, &names)
            }
            Family::CentralComposite(_) => self.build_ccd().map(|ccd| ccd.design),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_factorial() {
        let design = DesignBuilder::new().factors(4).build().unwrap();
        assert_eq!(design.runs(), 16);
        assert_eq!(design.factor_names()[3], "X4");
    }

    #[test]
    fn test_builder_names_imply_factors() {
        let design = DesignBuilder::new().names(&["A", "B", "C"]).build().unwrap();
        assert_eq!(design.factors(), 3);
        assert_eq!(design.factor_names()[0], "A");
    }

    #[test]
    fn test_builder_ccd() {
        let ccd = DesignBuilder::new()
            .factors(3)
            .central_composite(CcdType::Circumscribed)
            .center_points(6)
            .build_ccd()
            .unwrap();
        assert_eq!(ccd.total_runs, 8 + 6 + 6);
        assert!((ccd.alpha - 8.0_f64.powf(0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_builder_errors() {
        assert!(DesignBuilder::new().build().is_err());
        assert!(DesignBuilder::new()
            .factors(2)
            .center_points(2)
            .build()
            .is_err());
        assert!(DesignBuilder::new().factors(2).build_ccd().is_err());
        assert!(matches!(
            DesignBuilder::new().factors(3).names(&["A"]).build(),
            Err(Error::FactorNameMismatch { .. })
        ));
    }
}
