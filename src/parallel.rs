//! Parallel batch evaluation of independent datasets.
//!
//! Each function fans a batch across the rayon thread pool and returns one
//! `Result` per input, in input order. A failing dataset does not affect the
//! others. Enable with the `parallel` feature flag.
//!
//! # Usage
//!
//! ```
//! use doe_sqc::parallel::par_capability;
//! use doe_sqc::sqc::SpecLimits;
//!
//! let spec = SpecLimits::new(11.0, 9.0).unwrap();
//! let lines = vec![
//!     vec![9.9, 10.1, 10.0, 10.2, 9.8],
//!     vec![10.0],
//! ];
//! let reports = par_capability(&lines, &spec);
//!
//! assert!(reports[0].is_ok());
//! assert!(reports[1].is_err());
//! ```
//!
//! # Performance
//!
//! Parallel evaluation pays off for many datasets or long series. For a
//! handful of short series the sequential functions are faster due to
//! scheduling overhead.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::sqc::{
    detect_violations, i_mr, process_capability, xbar_r, CapabilityReport, ChartSeries, IMrChart,
    IMrConfig, RuleViolation, SpecLimits, XbarRChart,
};

/// Compute X̄-R charts for many independent subgroup sets.
///
/// Element `i` of the output is `xbar_r(&batches[i])`.
pub fn par_xbar_r<S>(batches: &[Vec<S>]) -> Vec<Result<XbarRChart>>
where
    S: AsRef<[f64]> + Sync,
{
    debug!(batches = batches.len(), "parallel X-bar/R");
    batches.par_iter().map(|b| xbar_r(b)).collect()
}

/// Compute I-MR charts for many independent series with a shared config.
pub fn par_i_mr<S>(series: &[S], config: &IMrConfig) -> Vec<Result<IMrChart>>
where
    S: AsRef<[f64]> + Sync,
{
    debug!(series = series.len(), "parallel I-MR");
    series.par_iter().map(|s| i_mr(s.as_ref(), config)).collect()
}

/// Capability reports for many datasets against one specification.
pub fn par_capability<S>(datasets: &[S], spec: &SpecLimits) -> Vec<Result<CapabilityReport>>
where
    S: AsRef<[f64]> + Sync,
{
    debug!(datasets = datasets.len(), "parallel capability");
    datasets
        .par_iter()
        .map(|d| process_capability(d.as_ref(), spec))
        .collect()
}

/// Run all Western Electric rules on each chart against its own limits.
pub fn par_detect_violations(charts: &[ChartSeries]) -> Vec<Result<Vec<RuleViolation>>> {
    debug!(charts = charts.len(), "parallel rule detection");
    charts
        .par_iter()
        .map(|c| detect_violations(&c.values, &c.limits))
        .collect()
}
