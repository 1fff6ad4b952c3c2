//! Display ranges per dimension.
//!
//! Every panel that shows dimension `i` must use the same range, so ranges are
//! resolved once per dimension with [`resolve_all`] and then handed out by value.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use crate::tensor::SampleTensor;

/// Fraction of the data extent added on each side when no policy is given.
pub const DEFAULT_PAD_FRACTION: f64 = 0.05;

/// A closed interval `[low, high]` with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub low: f64,
    pub high: f64,
}

impl DimensionRange {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(PlotError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.low..=self.high).contains(&x)
    }

    /// Widens the range by `fraction * width` on both sides.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = fraction * self.width();
        Self {
            low: self.low - pad,
            high: self.high + pad,
        }
    }
}

impl From<DimensionRange> for (f64, f64) {
    fn from(r: DimensionRange) -> Self {
        (r.low, r.high)
    }
}

/// How a range is derived from the data when the caller gives no override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RangePolicy {
    /// `(min, max)` widened by `pad_fraction * (max - min)` on each side.
    Padded { pad_fraction: f64 },
    /// `mean ± factor * std`, using the population standard deviation.
    Sigma { factor: f64 },
}

impl Default for RangePolicy {
    fn default() -> Self {
        RangePolicy::Padded {
            pad_fraction: DEFAULT_PAD_FRACTION,
        }
    }
}

/// Resolves the range for one dimension.
///
/// An override is used verbatim. Otherwise the data extent is padded by
/// `pad_fraction` of its width on each side; a constant dimension has no extent
/// and fails with [`PlotError::DegenerateRange`].
pub fn resolve(
    values: ArrayView1<f64>,
    range_override: Option<(f64, f64)>,
    pad_fraction: f64,
) -> Result<DimensionRange> {
    resolve_with_policy(values, range_override, RangePolicy::Padded { pad_fraction })
}

pub fn resolve_with_policy(
    values: ArrayView1<f64>,
    range_override: Option<(f64, f64)>,
    policy: RangePolicy,
) -> Result<DimensionRange> {
    if let Some((low, high)) = range_override {
        return DimensionRange::new(low, high);
    }
    match policy {
        RangePolicy::Padded { pad_fraction } => {
            let padded = data_extent(values)?.padded(pad_fraction);
            DimensionRange::new(padded.low, padded.high)
        }
        RangePolicy::Sigma { factor } => {
            let mean = values.mean().ok_or(PlotError::EmptyAxis { axis: "sample" })?;
            let spread = factor * values.std(0.0);
            if spread == 0.0 {
                return Err(PlotError::DegenerateRange { value: mean });
            }
            DimensionRange::new(mean - spread, mean + spread)
        }
    }
}

/// Exact `(min, max)` of the values, without padding.
pub fn data_extent(values: ArrayView1<f64>) -> Result<DimensionRange> {
    let min = *values.min()?;
    let max = *values.max()?;
    if min == max {
        return Err(PlotError::DegenerateRange { value: min });
    }
    DimensionRange::new(min, max)
}

/// Resolves one range per dimension of `samples`, pooling all chains.
///
/// Fails on the first dimension that cannot be resolved, or if an override
/// names a dimension the samples do not have.
pub fn resolve_all(
    samples: &SampleTensor,
    overrides: &BTreeMap<usize, (f64, f64)>,
    policy: RangePolicy,
) -> Result<Vec<DimensionRange>> {
    let columns: Vec<Array1<f64>> = (0..samples.n_dims()).map(|d| samples.flat_dim(d)).collect();
    resolve_columns(&columns, overrides, policy)
}

/// Same as [`resolve_all`], for dimensions already flattened into one column
/// each.
pub fn resolve_columns(
    columns: &[Array1<f64>],
    overrides: &BTreeMap<usize, (f64, f64)>,
    policy: RangePolicy,
) -> Result<Vec<DimensionRange>> {
    let n_dims = columns.len();
    if let Some(&index) = overrides.keys().find(|&&i| i >= n_dims) {
        return Err(PlotError::UnknownDimension { index, n_dims });
    }
    columns
        .iter()
        .enumerate()
        .map(|(d, values)| resolve_with_policy(values.view(), overrides.get(&d).copied(), policy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, Array1};

    #[test]
    fn test_zero_padding_returns_exact_extent() {
        let values = arr1(&[3.0, -1.5, 2.0, 7.25, 0.0]);
        let r = resolve(values.view(), None, 0.0).unwrap();
        assert_eq!(r, DimensionRange { low: -1.5, high: 7.25 });
    }

    #[test]
    fn test_padding_is_symmetric() {
        let values = arr1(&[0.0, 10.0]);
        let r = resolve(values.view(), None, 0.05).unwrap();
        assert_abs_diff_eq!(r.low, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(r.high, 10.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_input_needs_override() {
        let values = Array1::from_elem(50, 5.0);
        let err = resolve(values.view(), None, 0.05).unwrap_err();
        assert!(matches!(err, PlotError::DegenerateRange { value } if value == 5.0));

        let r = resolve(values.view(), Some((0.0, 10.0)), 0.05).unwrap();
        assert_eq!(r, DimensionRange { low: 0.0, high: 10.0 });
    }

    #[test]
    fn test_override_must_be_ordered() {
        let values = arr1(&[0.0, 1.0]);
        for bad in [(1.0, 1.0), (2.0, 1.0), (f64::NAN, 1.0)] {
            let err = resolve(values.view(), Some(bad), 0.05).unwrap_err();
            assert!(matches!(err, PlotError::InvalidRange { .. }));
        }
    }

    #[test]
    fn test_sigma_policy() {
        let values = arr1(&[1.0, 3.0]);
        let r = resolve_with_policy(values.view(), None, RangePolicy::Sigma { factor: 3.0 }).unwrap();
        assert_abs_diff_eq!(r.low, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.high, 5.0, epsilon = 1e-12);

        let flat = Array1::from_elem(4, 2.0);
        let err = resolve_with_policy(flat.view(), None, RangePolicy::Sigma { factor: 3.0 })
            .unwrap_err();
        assert!(matches!(err, PlotError::DegenerateRange { .. }));
    }

    #[test]
    fn test_resolve_all_rejects_unknown_override() {
        let samples = SampleTensor::from_shape_vec((1, 2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert(2, (0.0, 1.0));
        let err = resolve_all(&samples, &overrides, RangePolicy::default()).unwrap_err();
        assert!(matches!(err, PlotError::UnknownDimension { index: 2, n_dims: 2 }));

        overrides.clear();
        overrides.insert(1, (-5.0, 5.0));
        let ranges = resolve_all(&samples, &overrides, RangePolicy::Padded { pad_fraction: 0.0 })
            .unwrap();
        assert_eq!(ranges[0], DimensionRange { low: 0.0, high: 2.0 });
        assert_eq!(ranges[1], DimensionRange { low: -5.0, high: 5.0 });
    }

    #[test]
    fn test_resolve_columns_matches_tensor_resolution() {
        let samples =
            SampleTensor::from_shape_vec((2, 2, 2), vec![0.0, 4.0, 1.0, 3.0, -2.0, 5.0, 2.0, 6.0])
                .unwrap();
        let columns: Vec<Array1<f64>> = (0..2).map(|d| samples.flat_dim(d)).collect();
        let overrides = BTreeMap::new();
        let from_columns = resolve_columns(&columns, &overrides, RangePolicy::default()).unwrap();
        assert_eq!(
            from_columns,
            resolve_all(&samples, &overrides, RangePolicy::default()).unwrap()
        );
        assert_abs_diff_eq!(from_columns[0].low, -2.2, epsilon = 1e-12);
        assert_abs_diff_eq!(from_columns[1].high, 6.15, epsilon = 1e-12);
    }
}
