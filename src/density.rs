/*!
Fixed-bin histogram estimates for diagonal (1-D) and off-diagonal (2-D) panels.

Bin edges are linearly spaced over the resolved [`DimensionRange`], so every
panel sharing a dimension also shares its bin grid. Bins are half-open
`[e_k, e_{k+1})` except the last one, which also includes the upper edge.
Values outside the range are silently dropped: ranges are padded on purpose,
so anything outside an explicit range is intentionally clipped, not an error.

# Examples

```rust
use mcmc_corner::density::histogram_1d;
use mcmc_corner::range::DimensionRange;
use ndarray::arr1;

let values = arr1(&[0.1, 0.2, 0.6, 1.0, 3.0]);
let hist = histogram_1d(values.view(), DimensionRange::new(0.0, 1.0)?, 2)?;
// 3.0 lies outside the range and is dropped; 1.0 sits on the closed upper edge.
assert_eq!(hist.values.to_vec(), vec![2.0, 2.0]);
# Ok::<(), mcmc_corner::error::PlotError>(())
```
*/

use ndarray::{Array1, Array2, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use crate::range::DimensionRange;

/// Marginal histogram: `edges.len() == values.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    pub edges: Array1<f64>,
    /// Raw counts, or densities when `normalized` is set.
    pub values: Array1<f64>,
    pub normalized: bool,
}

/// Joint histogram over `(x, y)`; `values[(bin_x, bin_y)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    pub x_edges: Array1<f64>,
    pub y_edges: Array1<f64>,
    pub values: Array2<f64>,
    pub normalized: bool,
}

/// `bin_count + 1` evenly spaced edges spanning `range`.
pub fn linear_edges(range: DimensionRange, bin_count: usize) -> Array1<f64> {
    let mut edges = Array1::linspace(range.low, range.high, bin_count + 1);
    // linspace can land a hair off the upper bound
    edges[bin_count] = range.high;
    edges
}

/// Bin of `edges` that `x` falls into, or `None` when it lies outside them.
///
/// The arithmetic guess is corrected against the edges themselves, so a value
/// sitting exactly on `edges[k]` always lands in bin `k`.
pub fn bin_index(x: f64, edges: ArrayView1<f64>) -> Option<usize> {
    let bin_count = edges.len().checked_sub(1).filter(|&n| n > 0)?;
    let (low, high) = (edges[0], edges[bin_count]);
    if x.is_nan() || x < low || x > high {
        return None;
    }
    let mut k = ((x - low) / (high - low) * bin_count as f64) as usize;
    k = k.min(bin_count - 1);
    while k > 0 && x < edges[k] {
        k -= 1;
    }
    while k + 1 < bin_count && x >= edges[k + 1] {
        k += 1;
    }
    Some(k)
}

/// Raw counts of `values` in `bin_count` equal-width bins over `range`.
pub fn histogram_1d(
    values: ArrayView1<f64>,
    range: DimensionRange,
    bin_count: usize,
) -> Result<Histogram1D> {
    if bin_count == 0 {
        return Err(PlotError::InvalidBinCount);
    }
    let edges = linear_edges(range, bin_count);
    let mut counts = Array1::<f64>::zeros(bin_count);
    values
        .iter()
        .filter_map(|&x| bin_index(x, edges.view()))
        .for_each(|k| counts[k] += 1.0);

    Ok(Histogram1D {
        edges,
        values: counts,
        normalized: false,
    })
}

/// Joint counts with the same bin count along both axes.
pub fn histogram_2d(
    values_x: ArrayView1<f64>,
    values_y: ArrayView1<f64>,
    range_x: DimensionRange,
    range_y: DimensionRange,
    bin_count: usize,
) -> Result<Histogram2D> {
    histogram_2d_shaped(values_x, values_y, range_x, range_y, (bin_count, bin_count))
}

/// Joint counts on an `(x_bins, y_bins)` grid. A sample is counted only if
/// both coordinates fall inside their ranges.
pub fn histogram_2d_shaped(
    values_x: ArrayView1<f64>,
    values_y: ArrayView1<f64>,
    range_x: DimensionRange,
    range_y: DimensionRange,
    (x_bins, y_bins): (usize, usize),
) -> Result<Histogram2D> {
    if x_bins == 0 || y_bins == 0 {
        return Err(PlotError::InvalidBinCount);
    }
    if values_x.len() != values_y.len() {
        return Err(PlotError::DimensionMismatch {
            what: "joint histogram y values",
            expected: values_x.len(),
            got: values_y.len(),
        });
    }

    let x_edges = linear_edges(range_x, x_bins);
    let y_edges = linear_edges(range_y, y_bins);
    let mut counts = Array2::<f64>::zeros((x_bins, y_bins));
    Zip::from(&values_x).and(&values_y).for_each(|&x, &y| {
        if let (Some(i), Some(j)) = (bin_index(x, x_edges.view()), bin_index(y, y_edges.view())) {
            counts[(i, j)] += 1.0;
        }
    });

    Ok(Histogram2D {
        x_edges,
        y_edges,
        values: counts,
        normalized: false,
    })
}

fn widths(edges: &Array1<f64>) -> Array1<f64> {
    if edges.len() < 2 {
        return Array1::zeros(0);
    }
    let n = edges.len() - 1;
    &edges.slice(ndarray::s![1..]) - &edges.slice(ndarray::s![..n])
}

impl Histogram1D {
    pub fn bin_count(&self) -> usize {
        self.values.len()
    }

    pub fn bin_widths(&self) -> Array1<f64> {
        widths(&self.edges)
    }

    /// Sum of `value * width`; 1 for a normalized histogram with any mass.
    pub fn integral(&self) -> f64 {
        (&self.values * &self.bin_widths()).sum()
    }

    /// Rescales counts so the histogram integrates to one. An empty histogram
    /// stays all-zero.
    pub fn to_density(&self) -> Histogram1D {
        let area = self.integral();
        let values = if area > 0.0 {
            &self.values / area
        } else {
            self.values.clone()
        };
        Histogram1D {
            edges: self.edges.clone(),
            values,
            normalized: true,
        }
    }

    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

impl Histogram2D {
    /// Checks that `values` has one cell per pair of adjacent edges.
    pub fn validate(&self) -> Result<()> {
        let (nx, ny) = self.shape();
        let expected = |edges: &Array1<f64>| edges.len().saturating_sub(1);
        if nx == 0 || ny == 0 {
            return Err(PlotError::InvalidBinCount);
        }
        if expected(&self.x_edges) != nx {
            return Err(PlotError::DimensionMismatch {
                what: "joint histogram x edges",
                expected: nx + 1,
                got: self.x_edges.len(),
            });
        }
        if expected(&self.y_edges) != ny {
            return Err(PlotError::DimensionMismatch {
                what: "joint histogram y edges",
                expected: ny + 1,
                got: self.y_edges.len(),
            });
        }
        Ok(())
    }

    /// `(x_bins, y_bins)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Area of every cell, laid out like `values`.
    pub fn cell_areas(&self) -> Array2<f64> {
        let wx = widths(&self.x_edges);
        let wy = widths(&self.y_edges);
        let (nx, ny) = self.shape();
        Array2::from_shape_fn((nx, ny), |(i, j)| wx[i] * wy[j])
    }

    /// Total probability mass, `sum(value * area)`.
    pub fn mass(&self) -> f64 {
        (&self.values * &self.cell_areas()).sum()
    }

    pub fn to_density(&self) -> Histogram2D {
        let mass = self.mass();
        let values = if mass > 0.0 {
            &self.values / mass
        } else {
            self.values.clone()
        };
        Histogram2D {
            x_edges: self.x_edges.clone(),
            y_edges: self.y_edges.clone(),
            values,
            normalized: true,
        }
    }

    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}
