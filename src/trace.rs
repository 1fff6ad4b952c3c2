/*!
Walker trace layout: one panel per dimension, stacked vertically, each showing
every chain's trajectory through that dimension plus a cross-chain aggregate.

This is a pure reshaping of the samples; nothing is binned or padded.

# Examples

```rust
use mcmc_corner::plan::PanelPayload;
use mcmc_corner::tensor::SampleTensor;
use mcmc_corner::trace::{self, TraceConfig};
use ndarray::Array3;

let samples = SampleTensor::new(Array3::from_shape_fn((5, 50, 2), |(c, s, d)| {
    (c + s * d) as f64
}))?;
let plan = trace::build::<&str>(&samples, None, &TraceConfig::default())?;
assert_eq!(plan.trace_panels().count(), 2);
if let PanelPayload::Trace { chains, .. } = &plan.panels[0].payload {
    assert_eq!(chains.len(), 5);
    assert_eq!(chains[0].values.len(), 50);
}
# Ok::<(), mcmc_corner::error::PlotError>(())
```
*/

use std::collections::BTreeMap;

use log::debug;
use ndarray::{Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use crate::plan::{
    resolve_labels, AxisSpec, DrawPlan, LineSeries, LineStyle, Panel, PanelKind, PanelPayload,
    PlotKind,
};
use crate::range::{data_extent, DimensionRange};
use crate::tensor::SampleTensor;

/// Cross-chain summary drawn on top of the individual chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    #[default]
    Mean,
    Median,
}

impl Aggregate {
    fn name(&self) -> &'static str {
        match self {
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
        }
    }

    /// One value per step of a `(chains, steps)` view.
    pub fn per_step(&self, values: ArrayView2<f64>) -> Array1<f64> {
        match self {
            Aggregate::Mean => values
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(values.ncols())),
            Aggregate::Median => values
                .axis_iter(Axis(1))
                .map(|step| {
                    let mut v = step.to_vec();
                    v.sort_unstable_by(f64::total_cmp);
                    let mid = v.len() / 2;
                    if v.len() % 2 == 0 {
                        0.5 * (v[mid - 1] + v[mid])
                    } else {
                        v[mid]
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Explicit y range per dimension index.
    pub range_overrides: BTreeMap<usize, (f64, f64)>,
    pub aggregate: Aggregate,
    pub line_style: LineStyle,
    pub aggregate_style: LineStyle,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            range_overrides: BTreeMap::new(),
            aggregate: Aggregate::default(),
            line_style: LineStyle::default(),
            aggregate_style: LineStyle::default()
                .set_color("red")
                .set_alpha(1.0)
                .set_width(1.5),
        }
    }
}

impl TraceConfig {
    pub fn set_range(mut self, dim: usize, low: f64, high: f64) -> Self {
        self.range_overrides.insert(dim, (low, high));
        self
    }

    pub fn set_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn set_line_style(mut self, style: LineStyle) -> Self {
        self.line_style = style;
        self
    }

    pub fn set_aggregate_style(mut self, style: LineStyle) -> Self {
        self.aggregate_style = style;
        self
    }
}

/// Builds the walker trace plan.
///
/// The y range of each panel is the exact `(min, max)` of that dimension, or
/// the override. A constant dimension has no such range and is left for the
/// renderer to autoscale.
pub fn build<S: AsRef<str>>(
    samples: &SampleTensor,
    dim_labels: Option<&[S]>,
    config: &TraceConfig,
) -> Result<DrawPlan> {
    let (n_chains, n_steps, n_dims) = samples.shape();
    let labels = resolve_labels(dim_labels, n_dims)?;
    if let Some(&index) = config.range_overrides.keys().find(|&&i| i >= n_dims) {
        return Err(PlotError::UnknownDimension { index, n_dims });
    }
    let y_ranges = (0..n_dims)
        .map(|d| match config.range_overrides.get(&d) {
            Some(&(low, high)) => DimensionRange::new(low, high).map(Some),
            None => match data_extent(samples.flat_dim(d).view()) {
                Ok(r) => Ok(Some(r)),
                Err(PlotError::DegenerateRange { value }) => {
                    debug!("Dimension {} is constant at {}; autoscaling its trace", d, value);
                    Ok(None)
                }
                Err(e) => Err(e),
            },
        })
        .collect::<Result<Vec<_>>>()?;
    let steps = DimensionRange::new(0.0, n_steps as f64)?;

    let panels = (0..n_dims)
        .map(|d| {
            let chains = (0..n_chains)
                .map(|c| LineSeries {
                    name: format!("chain {c}"),
                    values: samples.chain(c, d).to_vec(),
                    style: config.line_style.clone(),
                })
                .collect();
            let aggregate = LineSeries {
                name: config.aggregate.name().to_string(),
                values: config.aggregate.per_step(samples.dim(d)).to_vec(),
                style: config.aggregate_style.clone(),
            };

            let mut x_axis = AxisSpec::new(Some(steps));
            if d + 1 == n_dims {
                x_axis = x_axis.outer(Some("Step"));
            }
            Panel {
                row: d,
                col: 0,
                kind: PanelKind::TraceLine,
                x_axis,
                y_axis: AxisSpec::new(y_ranges[d]).outer(Some(labels[d].as_str())),
                payload: PanelPayload::Trace { chains, aggregate },
            }
        })
        .collect();

    Ok(DrawPlan {
        kind: PlotKind::Trace,
        rows: n_dims,
        cols: 1,
        labels,
        panels,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, arr3};

    #[test]
    fn test_aggregates() {
        let values = arr2(&[[1.0, 5.0], [2.0, -1.0], [9.0, 2.0]]);
        let mean = Aggregate::Mean.per_step(values.view());
        assert_abs_diff_eq!(mean[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[1], 2.0, epsilon = 1e-12);
        let median = Aggregate::Median.per_step(values.view());
        assert_eq!(median.to_vec(), vec![2.0, 2.0]);

        let even = arr2(&[[1.0], [4.0]]);
        assert_eq!(Aggregate::Median.per_step(even.view()).to_vec(), vec![2.5]);
    }

    #[test]
    fn test_ranges_are_unpadded_and_overridable() {
        let samples = SampleTensor::new(arr3(&[
            [[0.0, 1.0], [2.0, 1.0]],
            [[-3.0, 1.0], [1.0, 1.0]],
        ]))
        .unwrap();
        let plan = build(&samples, Some(&["x", "y"][..]), &TraceConfig::default()).unwrap();
        assert_eq!(
            plan.panels[0].y_axis.range,
            Some(DimensionRange { low: -3.0, high: 2.0 })
        );
        // constant dimension: autoscaled
        assert_eq!(plan.panels[1].y_axis.range, None);
        assert_eq!(plan.panels[1].x_axis.label.as_deref(), Some("Step"));
        assert_eq!(plan.panels[0].x_axis.label, None);
        assert_eq!(
            plan.panels[0].x_axis.range,
            Some(DimensionRange { low: 0.0, high: 2.0 })
        );

        let config = TraceConfig::default().set_range(1, 0.0, 2.0);
        let plan = build::<&str>(&samples, None, &config).unwrap();
        assert_eq!(
            plan.panels[1].y_axis.range,
            Some(DimensionRange { low: 0.0, high: 2.0 })
        );
        assert_eq!(plan.panels[1].y_axis.label.as_deref(), Some("dim 1"));
    }

    #[test]
    fn test_bad_override_fails() {
        let samples = SampleTensor::new(arr3(&[[[0.0], [1.0]]])).unwrap();
        let config = TraceConfig::default().set_range(0, 1.0, 1.0);
        assert!(matches!(
            build::<&str>(&samples, None, &config),
            Err(PlotError::InvalidRange { .. })
        ));
        let config = TraceConfig::default().set_range(3, 0.0, 1.0);
        assert!(matches!(
            build::<&str>(&samples, None, &config),
            Err(PlotError::UnknownDimension { index: 3, .. })
        ));
    }
}
