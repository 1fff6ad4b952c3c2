/*!
Corner plot layout: a lower-triangular grid with one marginal histogram per
dimension on the diagonal and one joint histogram (with credible contours) per
pair of dimensions below it.

Panel `(row i, col j)` with `j < i` plots dimension `j` on x and dimension `i`
on y. Ranges are resolved once per dimension before any panel is built, and
the same [`DimensionRange`] value is copied into every panel that shows that
dimension, so axes line up along rows and columns.

# Examples

```rust
use mcmc_corner::corner::{self, CornerConfig};
use mcmc_corner::tensor::SampleTensor;
use ndarray::Array3;

let data = Array3::from_shape_fn((4, 100, 3), |(c, s, d)| {
    ((c * 100 + s) as f64 * (0.37 + d as f64)).sin()
});
let samples = SampleTensor::new(data)?;
let config = CornerConfig::default().set_bins(20);
let plan = corner::build(&samples, Some(&["a", "b", "c"][..]), &config)?;

assert_eq!(plan.diagonal_panels().count(), 3);
assert_eq!(plan.off_diagonal_panels().count(), 3);
# Ok::<(), mcmc_corner::error::PlotError>(())
```
*/

use std::collections::BTreeMap;

use log::{debug, trace};
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::contour::{self, DEFAULT_CREDIBLE_LEVELS};
use crate::density::{histogram_1d, histogram_2d_shaped};
use crate::error::{PlotError, Result, Warning};
use crate::plan::{
    resolve_labels, AxisSpec, DrawPlan, HistogramStyle, JointStyle, Panel, PanelKind, PanelPayload,
    PlotKind, DEFAULT_COLOR_MAP,
};
use crate::range::{resolve_columns, DimensionRange, RangePolicy};
use crate::tensor::SampleTensor;

pub const DEFAULT_BINS: usize = 50;

/// Joint panels are computed on the rayon pool from this many dimensions up.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bins {
    Uniform(usize),
    PerDimension(Vec<usize>),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Uniform(DEFAULT_BINS)
    }
}

impl Bins {
    /// Bin count per dimension.
    pub fn resolve(&self, n_dims: usize) -> Result<Vec<usize>> {
        let bins = match self {
            Bins::Uniform(n) => vec![*n; n_dims],
            Bins::PerDimension(v) if v.len() != n_dims => {
                return Err(PlotError::DimensionMismatch {
                    what: "per-dimension bin counts",
                    expected: n_dims,
                    got: v.len(),
                })
            }
            Bins::PerDimension(v) => v.clone(),
        };
        if bins.contains(&0) {
            return Err(PlotError::InvalidBinCount);
        }
        Ok(bins)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerConfig {
    pub bins: Bins,
    /// Ascending, each in `(0, 1)`.
    pub credible_levels: Vec<f64>,
    /// Explicit `(low, high)` per dimension index; used verbatim.
    pub range_overrides: BTreeMap<usize, (f64, f64)>,
    pub range_policy: RangePolicy,
    /// Normalize histograms to unit mass instead of raw counts.
    pub density: bool,
    pub joint_style: JointStyle,
    /// Color map hint for joint panels.
    pub color_map: String,
    pub marginal_style: HistogramStyle,
    pub parallel_threshold: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            bins: Bins::default(),
            credible_levels: DEFAULT_CREDIBLE_LEVELS.to_vec(),
            range_overrides: BTreeMap::new(),
            range_policy: RangePolicy::default(),
            density: true,
            joint_style: JointStyle::default(),
            color_map: DEFAULT_COLOR_MAP.to_string(),
            marginal_style: HistogramStyle::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CornerConfig {
    pub fn set_bins(mut self, bin_count: usize) -> Self {
        self.bins = Bins::Uniform(bin_count);
        self
    }

    pub fn set_bins_per_dimension(mut self, bins: Vec<usize>) -> Self {
        self.bins = Bins::PerDimension(bins);
        self
    }

    pub fn set_credible_levels(mut self, levels: Vec<f64>) -> Self {
        self.credible_levels = levels;
        self
    }

    pub fn set_range(mut self, dim: usize, low: f64, high: f64) -> Self {
        self.range_overrides.insert(dim, (low, high));
        self
    }

    pub fn set_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    pub fn set_pad_fraction(self, pad_fraction: f64) -> Self {
        self.set_range_policy(RangePolicy::Padded { pad_fraction })
    }

    pub fn set_density(mut self, density: bool) -> Self {
        self.density = density;
        self
    }

    pub fn set_joint_style(mut self, style: JointStyle) -> Self {
        self.joint_style = style;
        self
    }

    pub fn set_color_map(mut self, color_map: &str) -> Self {
        self.color_map = color_map.to_string();
        self
    }

    pub fn set_marginal_style(mut self, style: HistogramStyle) -> Self {
        self.marginal_style = style;
        self
    }

    pub fn set_parallel_threshold(mut self, n_dims: usize) -> Self {
        self.parallel_threshold = n_dims;
        self
    }
}

/// Builds the corner plot plan.
///
/// Labels, bins, levels and ranges are all checked before any histogram is
/// computed; on error no plan is produced. A joint panel whose histogram is
/// empty inside its ranges keeps its panel but loses its contours, and the
/// condition is listed in [`DrawPlan::warnings`].
pub fn build<S: AsRef<str>>(
    samples: &SampleTensor,
    dim_labels: Option<&[S]>,
    config: &CornerConfig,
) -> Result<DrawPlan> {
    let n_dims = samples.n_dims();
    let labels = resolve_labels(dim_labels, n_dims)?;
    let bins = config.bins.resolve(n_dims)?;
    contour::validate_levels(&config.credible_levels)?;
    let columns: Vec<Array1<f64>> = (0..n_dims).map(|d| samples.flat_dim(d)).collect();
    let ranges = resolve_columns(&columns, &config.range_overrides, config.range_policy)?;
    debug!("Resolved corner ranges: {:?}", ranges);

    let layout = Layout {
        columns: &columns,
        ranges: &ranges,
        bins: &bins,
        labels: &labels,
        config,
    };

    let mut panels = (0..n_dims)
        .map(|d| layout.diagonal(d))
        .collect::<Result<Vec<_>>>()?;

    let pairs: Vec<(usize, usize)> = (0..n_dims)
        .flat_map(|row| (0..row).map(move |col| (row, col)))
        .collect();
    let joints = if n_dims >= config.parallel_threshold {
        pairs
            .par_iter()
            .map(|&(row, col)| layout.joint(row, col))
            .collect::<Result<Vec<_>>>()?
    } else {
        pairs
            .iter()
            .map(|&(row, col)| layout.joint(row, col))
            .collect::<Result<Vec<_>>>()?
    };

    let mut warnings = Vec::new();
    for (panel, warning) in joints {
        warnings.extend(warning);
        panels.push(panel);
    }
    panels.sort_by_key(|p| (p.row, p.col));
    debug!(
        "Built corner plan: {} panels over {} dimensions, {} warnings",
        panels.len(),
        n_dims,
        warnings.len()
    );

    Ok(DrawPlan {
        kind: PlotKind::Corner,
        rows: n_dims,
        cols: n_dims,
        labels,
        panels,
        warnings,
    })
}

/// Everything a single panel needs, resolved up front and shared read-only.
struct Layout<'a> {
    columns: &'a [Array1<f64>],
    ranges: &'a [DimensionRange],
    bins: &'a [usize],
    labels: &'a [String],
    config: &'a CornerConfig,
}

impl Layout<'_> {
    fn is_bottom(&self, row: usize) -> bool {
        row + 1 == self.ranges.len()
    }

    fn diagonal(&self, d: usize) -> Result<Panel> {
        trace!("Marginal histogram for dimension {}", d);
        let mut hist = histogram_1d(self.columns[d].view(), self.ranges[d], self.bins[d])?;
        if self.config.density {
            hist = hist.to_density();
        }

        let mut x_axis = AxisSpec::new(Some(self.ranges[d]));
        if self.is_bottom(d) {
            x_axis = x_axis.outer(Some(self.labels[d].as_str()));
        }
        Ok(Panel {
            row: d,
            col: d,
            kind: PanelKind::Diagonal,
            x_axis,
            y_axis: AxisSpec::new(None),
            payload: PanelPayload::Marginal {
                histogram: hist,
                style: self.config.marginal_style.clone(),
            },
        })
    }

    /// Dimension `col` on x, dimension `row` on y.
    fn joint(&self, row: usize, col: usize) -> Result<(Panel, Option<Warning>)> {
        trace!("Joint histogram for dimensions ({}, {})", col, row);
        let mut hist = histogram_2d_shaped(
            self.columns[col].view(),
            self.columns[row].view(),
            self.ranges[col],
            self.ranges[row],
            (self.bins[col], self.bins[row]),
        )?;
        if self.config.density {
            hist = hist.to_density();
        }

        let mut contours = contour::solve(&hist, &self.config.credible_levels)?;
        let warning = contours.warning.map(|w| w.for_pair(col, row));
        contours.warning = warning;

        let mut x_axis = AxisSpec::new(Some(self.ranges[col]));
        if self.is_bottom(row) {
            x_axis = x_axis.outer(Some(self.labels[col].as_str()));
        }
        let mut y_axis = AxisSpec::new(Some(self.ranges[row]));
        if col == 0 {
            y_axis = y_axis.outer(Some(self.labels[row].as_str()));
        }

        let panel = Panel {
            row,
            col,
            kind: PanelKind::OffDiagonal,
            x_axis,
            y_axis,
            payload: PanelPayload::Joint {
                histogram: hist,
                contours,
                style: self.config.joint_style,
                color_map: self.config.color_map.clone(),
            },
        };
        Ok((panel, warning))
    }
}
