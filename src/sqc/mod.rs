//! Statistical Quality Control.
//!
//! Control charts, run rules, capability indices and sequential monitors for
//! raw measurement sequences.
//!
//! ## Overview
//!
//! - Variables charts: [`xbar_r`], [`xbar_s`], [`i_mr`]
//! - Attributes charts: [`p_chart`], [`np_chart`], [`c_chart`], [`u_chart`]
//! - Run rules: [`detect_violations`] for the eight Western Electric rules
//! - Capability: [`process_capability`] (Cp, Cpk, Pp, Ppk, Cpm, DPMO)
//! - Sequential monitors: [`cusum`], [`ewma`]
//!
//! ## Quick Start
//!
//! ```rust
//! use doe_sqc::sqc::{detect_violations, i_mr, xbar_r, IMrConfig};
//!
//! let subgroups = vec![
//!     vec![25.0, 26.0, 24.5, 25.5, 25.0],
//!     vec![25.2, 24.8, 25.1, 24.9, 25.3],
//!     vec![25.1, 25.4, 24.7, 25.0, 24.8],
//! ];
//! let chart = xbar_r(&subgroups).unwrap();
//! println!("X-bar: {}", chart.xbar.limits);
//! println!("R:     {}", chart.range.limits);
//!
//! let series = [10.0, 10.2, 9.9, 10.1, 10.3, 9.8, 10.0];
//! let imr = i_mr(&series, &IMrConfig::default()).unwrap();
//! let violations = detect_violations(&imr.individuals.values, &imr.individuals.limits).unwrap();
//! assert!(violations.is_empty());
//! ```
//!
//! ## Constants
//!
//! Limits for subgroup charts use the tabulated constants A2, A3, B3, B4, D3,
//! D4, d2 and c4 for subgroup sizes 2 through 25. See [`get_constants`].

mod attributes;
mod capability;
mod chart;
mod constants;
mod monitor;
mod rules;
mod variables;

pub use attributes::{c_chart, np_chart, p_chart, u_chart};
pub use capability::{process_capability, CapabilityReport, SpecLimits};
pub use chart::{AttributeChart, ChartSeries, ChartType, ControlLimits};
pub use constants::{get_constants, ChartConstants, CONSTANTS_TABLE};
pub use monitor::{
    cusum, ewma, CusumConfig, CusumResult, EwmaConfig, EwmaResult, MonitorSignal, ShiftDirection,
};
pub use rules::{
    dedup_violations, detect_rules, detect_violations, RuleViolation, WesternElectricRule,
};
pub use variables::{
    i_mr, xbar_r, xbar_s, IMrChart, IMrConfig, XbarRChart, XbarSChart, MIN_CHART_POINTS,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Chart limits feed the rule detector and the capability analysis.
    #[test]
    fn test_chart_to_rules_pipeline() {
        let mut series: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 10.0 } else { 10.4 })
            .collect();
        let imr = i_mr(&series, &IMrConfig::default()).unwrap();
        let limits = imr.individuals.limits;
        assert!(imr.individuals.is_in_control());

        series.push(limits.ucl + 1.0);
        let violations = detect_violations(&series, &limits).unwrap();
        assert!(violations
            .iter()
            .any(|v| v.rule == WesternElectricRule::BeyondLimits && v.points == vec![20]));

        let spec = SpecLimits::new(12.0, 8.0).unwrap();
        let report = process_capability(&series[..20], &spec).unwrap();
        assert!(report.cp > 1.0);
    }
}
