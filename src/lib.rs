//! # doe-sqc
//!
//! Design of Experiments and Statistical Quality Control computations.
//!
//! ## Overview
//!
//! The crate covers two halves of quality engineering:
//! - **Design of Experiments (DOE)**: two-level full factorials and
//!   central-composite designs, effect estimation, ANOVA, second-order
//!   response surfaces and desirability optimization
//! - **Statistical Quality Control (SQC)**: variables and attributes control
//!   charts, Western Electric run rules, process capability and CUSUM/EWMA
//!   monitoring
//!
//! Every operation is a pure function over slices, config structs and
//! [`DesignMatrix`](design::DesignMatrix) values, returning a typed
//! [`Result`].
//!
//! ## Quick Start
//!
//! Generate a design with the builder:
//!
//! ```rust
//! use doe_sqc::{CcdType, DesignBuilder};
//!
//! let design = DesignBuilder::new()
//!     .names(&["Temp", "Pressure"])
//!     .central_composite(CcdType::Circumscribed)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.factors(), 2);
//! assert_eq!(design.factor_names(), vec!["Temp", "Pressure"]);
//! ```
//!
//! Or compute control limits directly:
//!
//! ```rust
//! # #[cfg(feature = "sqc")]
//! # {
//! use doe_sqc::sqc::{c_chart, get_constants};
//!
//! let chart = c_chart(&[3, 5, 4, 6, 2, 4]).unwrap();
//! assert!((chart.center - 4.0).abs() < 1e-12);
//!
//! let k = get_constants(5);
//! assert!((k.a2 - 0.577).abs() < 1e-12);
//! # }
//! ```
//!
//! ## Coded Units
//!
//! Factor levels are held in coded units: −1/+1 for factorial corners, 0 for
//! center points and ±α for axial points. Use [`design::code`] and
//! [`design::decode`] to move between coded and physical units.
//!
//! ## Logging
//!
//! Computations emit `tracing` events at `debug` and `trace` level. The
//! library never installs a subscriber.
//!
//! ## Features
//!
//! - `doe` (default): effects, ANOVA, response surfaces and desirability
//! - `sqc` (default): control charts, run rules, capability and monitors
//! - `serde`: Enable serialization/deserialization of designs and results
//! - `parallel`: Batch evaluation of independent datasets using rayon

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod design;
#[cfg(feature = "doe")]
pub mod doe;
pub mod error;
#[cfg(feature = "sqc")]
pub mod sqc;
pub mod stats;

#[cfg(all(feature = "parallel", feature = "sqc"))]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::DesignBuilder;
    pub use crate::design::{
        central_composite, code, decode, full_factorial, rotatable_alpha, CcdConfig, CcdType,
        CentralComposite, DesignMatrix, FactorRange, PointType,
    };
    pub use crate::error::{Error, Result};

    #[cfg(feature = "doe")]
    pub use crate::doe::{
        all_effects, anova, find_stationary_point, fit_second_order, optimize_desirability,
        overall_desirability, ANOVATable, DesirabilityGoal, EffectEstimate, GridConfig,
        ResponseGoal, RsmModel, StationaryKind, StationaryPoint,
    };

    #[cfg(feature = "sqc")]
    pub use crate::sqc::{
        c_chart, cusum, detect_violations, ewma, i_mr, np_chart, p_chart, process_capability,
        u_chart, xbar_r, xbar_s, ControlLimits, CusumConfig, EwmaConfig, IMrConfig, SpecLimits,
        WesternElectricRule,
    };

    #[cfg(all(feature = "parallel", feature = "sqc"))]
    pub use crate::parallel::{par_capability, par_detect_violations, par_i_mr, par_xbar_r};
}

// Re-export commonly used items at crate root
pub use builder::DesignBuilder;
pub use design::{CcdType, DesignMatrix};
pub use error::{Error, Result};
