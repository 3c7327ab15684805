//! Experimental design matrices and generators.
//!
//! This module provides the data structures that flow through the DOE
//! pipeline and the generators that create them.
//!
//! ## Overview
//!
//! - [`DesignMatrix`]: coded factor levels (runs × factors) plus attached responses
//! - [`full_factorial`]: 2^k two-level designs
//! - [`central_composite`]: central-composite designs for response surfaces
//! - [`code`] / [`decode`]: conversion between physical and coded units
//!
//! ## Coded Levels
//!
//! Factor levels are stored in coded units: −1 and +1 for the factorial
//! corners, 0 for the center and ±α for axial points. Column `j` of the level
//! matrix always belongs to `factor_names()[j]`, so iteration order over
//! factors is fixed by the design, never by map ordering.

mod ccd;
mod coding;
mod factorial;

pub use ccd::{
    central_composite, rotatable_alpha, CcdConfig, CcdType, CentralComposite, MAX_CCD_FACTORS,
    MIN_CCD_FACTORS,
};
pub use coding::{code, decode, FactorRange};
pub use factorial::{full_factorial, MAX_FACTORIAL_FACTORS, MIN_FACTORIAL_FACTORS};

use ndarray::{Array2, ArrayView1};
use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance used when matching coded levels.
pub(crate) const LEVEL_TOLERANCE: f64 = 1e-9;

/// Role of a run within a design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointType {
    /// A corner of the two-level factorial cube.
    Factorial,
    /// A star point: one factor at ±α, the rest at 0.
    Axial,
    /// All factors at 0.
    Center,
}

impl PointType {
    /// Infer the point type from a row of coded levels.
    ///
    /// All-zero rows are center points; rows of two or more factors with a
    /// single nonzero level are axial points; everything else is factorial.
    #[must_use]
    pub fn infer(levels: ArrayView1<'_, f64>) -> Self {
        let nonzero = levels.iter().filter(|v| v.abs() > LEVEL_TOLERANCE).count();
        match nonzero {
            0 => Self::Center,
            1 if levels.len() >= 2 => Self::Axial,
            _ => Self::Factorial,
        }
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Factorial => "factorial",
            Self::Axial => "axial",
            Self::Center => "center",
        };
        f.write_str(name)
    }
}

/// A named response column attached to a design.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResponseColumn {
    /// Response name (e.g. "Y", "Yield").
    pub name: String,
    /// One observed value per run, in run order.
    pub values: Vec<f64>,
}

/// A single run materialized from a design.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Run {
    /// Zero-based run index in the design's run order.
    pub index: usize,
    /// Coded level for each factor, in factor order.
    pub levels: Vec<(String, f64)>,
    /// Role of the run in the design.
    pub point_type: PointType,
    /// Observed response values, in response-column order.
    pub responses: Vec<(String, f64)>,
}

impl Run {
    /// Coded level of the named factor.
    #[must_use]
    pub fn level(&self, factor: &str) -> Option<f64> {
        self.levels
            .iter()
            .find(|(name, _)| name == factor)
            .map(|&(_, v)| v)
    }

    /// Observed value of the named response.
    #[must_use]
    pub fn response(&self, name: &str) -> Option<f64> {
        self.responses
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }
}

/// An experimental design matrix.
///
/// Stores coded factor levels as a 2D matrix (runs × factors), the ordered
/// factor names, the role of each run and any response columns attached
/// after the experiment was carried out.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignMatrix {
    factor_names: Vec<String>,
    data: Array2<f64>,
    point_types: Vec<PointType>,
    responses: Vec<ResponseColumn>,
}

impl DesignMatrix {
    /// Create a design from coded levels, validating names and dimensions.
    ///
    /// Point types are inferred from each row with [`PointType::infer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the number of names differs from the number of
    /// columns, a name is empty or repeated, or a level is not finite.
    pub fn try_new(factor_names: Vec<String>, data: Array2<f64>) -> Result<Self> {
        let point_types = data.rows().into_iter().map(PointType::infer).collect();
        Self::with_point_types(factor_names, data, point_types)
    }

    /// Create a design with explicit point types.
    ///
    /// # Errors
    ///
    /// Same as [`DesignMatrix::try_new`], plus a `DimensionMismatch` when
    /// `point_types` does not have one entry per run.
    pub fn with_point_types(
        factor_names: Vec<String>,
        data: Array2<f64>,
        point_types: Vec<PointType>,
    ) -> Result<Self> {
        if factor_names.len() != data.ncols() {
            return Err(Error::FactorNameMismatch {
                expected: data.ncols(),
                actual: factor_names.len(),
            });
        }
        if point_types.len() != data.nrows() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} point types", data.nrows()),
                actual: format!("{} point types", point_types.len()),
            });
        }

        let mut seen = HashSet::with_capacity(factor_names.len());
        for name in &factor_names {
            if name.is_empty() {
                return Err(Error::invalid_params("factor names must not be empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::invalid_params(format!(
                    "duplicate factor name '{name}'"
                )));
            }
        }

        if data.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_params("coded levels must be finite"));
        }

        Ok(Self {
            factor_names,
            data,
            point_types,
            responses: Vec::new(),
        })
    }

    /// Create a design from row-major coded levels.
    ///
    /// # Errors
    ///
    /// Returns a `DimensionMismatch` if a row does not have one level per
    /// factor, and otherwise the same errors as [`DesignMatrix::try_new`].
    ///
    /// # Example
    ///
    /// ```
    /// use doe_sqc::design::DesignMatrix;
    ///
    /// let design = DesignMatrix::from_rows(
    ///     &["X1", "X2"],
    ///     &[vec![-1.0, -1.0], vec![1.0, -1.0], vec![-1.0, 1.0], vec![1.0, 1.0]],
    /// )
    /// .unwrap()
    /// .with_response("Y", vec![28.0, 36.0, 18.0, 31.0])
    /// .unwrap();
    ///
    /// assert_eq!(design.runs(), 4);
    /// assert_eq!(design.response("Y").unwrap()[1], 36.0);
    /// ```
    pub fn from_rows(factor_names: &[&str], rows: &[Vec<f64>]) -> Result<Self> {
        let k = factor_names.len();
        let mut flat = Vec::with_capacity(rows.len() * k);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != k {
                return Err(Error::DimensionMismatch {
                    expected: format!("{k} levels in run {i}"),
                    actual: format!("{} levels", row.len()),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), k), flat).map_err(|e| {
            Error::DimensionMismatch {
                expected: format!("{} × {k} matrix", rows.len()),
                actual: e.to_string(),
            }
        })?;
        Self::try_new(factor_names.iter().map(|s| (*s).to_string()).collect(), data)
    }

    /// Attach (or replace) a response column.
    ///
    /// # Errors
    ///
    /// Returns a `DimensionMismatch` if `values` does not hold one value per run.
    pub fn with_response(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.runs() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} response values", self.runs()),
                actual: format!("{} response values", values.len()),
            });
        }
        match self.responses.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.values = values,
            None => self.responses.push(ResponseColumn { name, values }),
        }
        Ok(self)
    }

    /// Get the number of runs (rows).
    #[must_use]
    pub fn runs(&self) -> usize {
        self.data.nrows()
    }

    /// Get the number of factors (columns).
    #[must_use]
    pub fn factors(&self) -> usize {
        self.data.ncols()
    }

    /// Get the ordered factor names.
    #[must_use]
    pub fn factor_names(&self) -> &[String] {
        &self.factor_names
    }

    /// Get a reference to the coded level matrix.
    #[must_use]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the design and return the coded level matrix.
    #[must_use]
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    /// Get the role of every run.
    #[must_use]
    pub fn point_types(&self) -> &[PointType] {
        &self.point_types
    }

    /// Get the attached response columns.
    #[must_use]
    pub fn responses(&self) -> &[ResponseColumn] {
        &self.responses
    }

    /// Get the coded level at a specific position.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[[row, col]]
    }

    /// Column index of the named factor.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFactor` if the design has no such factor.
    pub fn factor_index(&self, factor: &str) -> Result<usize> {
        self.factor_names
            .iter()
            .position(|n| n == factor)
            .ok_or_else(|| Error::UnknownFactor(factor.to_string()))
    }

    /// Coded levels of the named factor, in run order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFactor` if the design has no such factor.
    pub fn column(&self, factor: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.factor_index(factor)?;
        Ok(self.data.column(idx))
    }

    /// Values of the named response, in run order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownResponse` if no such response column is attached.
    pub fn response(&self, name: &str) -> Result<&[f64]> {
        self.responses
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.values.as_slice())
            .ok_or_else(|| Error::UnknownResponse(name.to_string()))
    }

    /// Materialize the run at `index`.
    #[must_use]
    pub fn run(&self, index: usize) -> Option<Run> {
        if index >= self.runs() {
            return None;
        }
        let levels = self
            .factor_names
            .iter()
            .zip(self.data.row(index).iter())
            .map(|(name, &v)| (name.clone(), v))
            .collect();
        let responses = self
            .responses
            .iter()
            .map(|r| (r.name.clone(), r.values[index]))
            .collect();
        Some(Run {
            index,
            levels,
            point_type: self.point_types[index],
            responses,
        })
    }

    /// Iterate over all runs in run order.
    pub fn iter_runs(&self) -> impl Iterator<Item = Run> + '_ {
        (0..self.runs()).filter_map(move |i| self.run(i))
    }

    /// Sum of each factor column.
    ///
    /// Every column of a two-level factorial or central-composite design sums
    /// to zero.
    #[must_use]
    pub fn column_sums(&self) -> Vec<f64> {
        self.data.columns().into_iter().map(|c| c.sum()).collect()
    }

    /// Number of runs with the given point type.
    #[must_use]
    pub fn count_points(&self, point_type: PointType) -> usize {
        self.point_types.iter().filter(|&&p| p == point_type).count()
    }

    /// Convert the coded matrix to physical units.
    ///
    /// # Errors
    ///
    /// Returns `FactorNameMismatch` if `ranges` does not have one entry per factor.
    pub fn to_actual(&self, ranges: &[FactorRange]) -> Result<Array2<f64>> {
        if ranges.len() != self.factors() {
            return Err(Error::FactorNameMismatch {
                expected: self.factors(),
                actual: ranges.len(),
            });
        }
        let mut actual = self.data.clone();
        for (mut col, range) in actual.columns_mut().into_iter().zip(ranges) {
            col.mapv_inplace(|v| range.decode(v));
        }
        Ok(actual)
    }
}

/// Resolve user-supplied factor names, falling back to `X1..Xk`.
pub(crate) fn resolve_names<S: AsRef<str>>(k: usize, names: &[S]) -> Result<Vec<String>> {
    if names.is_empty() {
        return Ok((1..=k).map(|i| format!("X{i}")).collect());
    }
    if names.len() != k {
        return Err(Error::FactorNameMismatch {
            expected: k,
            actual: names.len(),
        });
    }
    Ok(names.iter().map(|n| n.as_ref().to_string()).collect())
}

impl fmt::Debug for DesignMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DesignMatrix({} runs, factors {:?}) with data {:?}",
            self.runs(),
            self.factor_names,
            self.data
        )
    }
}

impl fmt::Display for DesignMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header: Vec<String> = self.factor_names.clone();
        header.extend(self.responses.iter().map(|r| r.name.clone()));
        writeln!(f, "  run  type       {}", header.join(" "))?;
        for (i, row) in self.data.rows().into_iter().enumerate() {
            let mut cells: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
            cells.extend(self.responses.iter().map(|r| format!("{:.4}", r.values[i])));
            writeln!(
                f,
                "  {:>3}  {:<9}  {}",
                i + 1,
                self.point_types[i].to_string(),
                cells.join(" ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_by_two() -> DesignMatrix {
        DesignMatrix::from_rows(
            &["A", "B"],
            &[
                vec![-1.0, -1.0],
                vec![1.0, -1.0],
                vec![-1.0, 1.0],
                vec![1.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_design_creation() {
        let design = two_by_two();
        assert_eq!(design.runs(), 4);
        assert_eq!(design.factors(), 2);
        assert_eq!(design.factor_names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(design.get(1, 0), 1.0);
        assert_eq!(design.column_sums(), vec![0.0, 0.0]);
        assert_eq!(design.count_points(PointType::Factorial), 4);
    }

    #[test]
    fn test_design_invalid() {
        // Name count mismatch
        let data = array![[1.0, -1.0]];
        assert!(matches!(
            DesignMatrix::try_new(vec!["A".into()], data.clone()),
            Err(Error::FactorNameMismatch { expected: 2, actual: 1 })
        ));

        // Duplicate names
        assert!(DesignMatrix::try_new(vec!["A".into(), "A".into()], data).is_err());

        // Ragged rows
        assert!(DesignMatrix::from_rows(&["A", "B"], &[vec![1.0]]).is_err());

        // Non-finite level
        assert!(DesignMatrix::from_rows(&["A"], &[vec![f64::NAN]]).is_err());
    }

    #[test]
    fn test_point_type_inference() {
        assert_eq!(PointType::infer(array![0.0, 0.0].view()), PointType::Center);
        assert_eq!(PointType::infer(array![1.414, 0.0].view()), PointType::Axial);
        assert_eq!(PointType::infer(array![1.0, -1.0].view()), PointType::Factorial);
        assert_eq!(PointType::infer(array![1.0].view()), PointType::Factorial);
    }

    #[test]
    fn test_responses() {
        let design = two_by_two()
            .with_response("Y", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_response("Z", vec![0.0; 4])
            .unwrap()
            .with_response("Y", vec![5.0, 6.0, 7.0, 8.0])
            .unwrap();

        assert_eq!(design.responses().len(), 2);
        assert_eq!(design.response("Y").unwrap(), &[5.0, 6.0, 7.0, 8.0]);
        assert!(matches!(
            design.response("W"),
            Err(Error::UnknownResponse(_))
        ));

        let bad = two_by_two().with_response("Y", vec![1.0]);
        assert!(matches!(bad, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_run_view() {
        let design = two_by_two()
            .with_response("Y", vec![28.0, 36.0, 18.0, 31.0])
            .unwrap();
        let run = design.run(1).unwrap();
        assert_eq!(run.level("A"), Some(1.0));
        assert_eq!(run.level("B"), Some(-1.0));
        assert_eq!(run.response("Y"), Some(36.0));
        assert!(design.run(4).is_none());
        assert_eq!(design.iter_runs().count(), 4);
    }

    #[test]
    fn test_column_lookup() {
        let design = two_by_two();
        let b = design.column("B").unwrap();
        assert_eq!(b.to_vec(), vec![-1.0, -1.0, 1.0, 1.0]);
        assert!(matches!(design.column("C"), Err(Error::UnknownFactor(_))));
    }

    #[test]
    fn test_to_actual() {
        let design = two_by_two();
        let ranges = [
            FactorRange::new(100.0, 200.0).unwrap(),
            FactorRange::new(1.0, 3.0).unwrap(),
        ];
        let actual = design.to_actual(&ranges).unwrap();
        assert_eq!(actual[[0, 0]], 100.0);
        assert_eq!(actual[[1, 0]], 200.0);
        assert_eq!(actual[[3, 1]], 3.0);
        assert!(design.to_actual(&ranges[..1]).is_err());
    }

    #[test]
    fn test_resolve_names() {
        let empty: [&str; 0] = [];
        assert_eq!(resolve_names(3, &empty).unwrap(), vec!["X1", "X2", "X3"]);
        assert_eq!(resolve_names(1, &["T"]).unwrap(), vec!["T"]);
        assert!(matches!(
            resolve_names(2, &["T"]),
            Err(Error::FactorNameMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_display() {
        let design = two_by_two().with_response("Y", vec![1.0; 4]).unwrap();
        let text = design.to_string();
        assert!(text.contains("A B Y"));
        assert!(text.contains("factorial"));
    }
}
