/*!
Highest-density-region contour levels for joint histograms.

For a credible level `p` the solver finds the density threshold `t` such that the
cells with density `>= t` form the smallest region holding at least `p` of the
total mass. Cells are ranked by density, their masses are accumulated from the
densest down, and the density of the cell that first pushes the running mass to
`p` becomes the threshold. Higher coverage therefore never yields a higher
threshold, which keeps the drawn contours nested.

# Examples

```rust
use mcmc_corner::contour::solve;
use mcmc_corner::density::Histogram2D;
use ndarray::{arr1, arr2};

let hist = Histogram2D {
    x_edges: arr1(&[0.0, 1.0, 2.0]),
    y_edges: arr1(&[0.0, 1.0, 2.0]),
    values: arr2(&[[6.0, 2.0], [1.0, 1.0]]),
    normalized: false,
};
let levels = solve(&hist, &[0.5, 0.9])?;
assert_eq!(levels.thresholds, vec![6.0, 1.0]);
# Ok::<(), mcmc_corner::error::PlotError>(())
```
*/

use log::warn;
use serde::{Deserialize, Serialize};

use crate::density::Histogram2D;
use crate::error::{PlotError, Result, Warning};

/// Credible levels used when the caller does not choose any.
pub const DEFAULT_CREDIBLE_LEVELS: [f64; 2] = [0.68, 0.95];

/// Slack on the cumulative mass comparison, so a level of exactly `k/n` is
/// not pushed one cell further by rounding.
const MASS_EPSILON: f64 = 1e-12;

/// Credible levels paired with their density thresholds, in ascending level
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLevelSet {
    pub levels: Vec<f64>,
    pub thresholds: Vec<f64>,
    /// Set when the histogram held no mass; every threshold is then zero.
    pub warning: Option<Warning>,
}

impl ContourLevelSet {
    pub fn is_degenerate(&self) -> bool {
        self.warning.is_some()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// `(level, threshold)` pairs that should actually be drawn. Zero
    /// thresholds mark suppressed contours.
    pub fn drawable(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels
            .iter()
            .copied()
            .zip(self.thresholds.iter().copied())
            .filter(|&(_, t)| t > 0.0)
    }
}

/// Checks that every level lies in `(0, 1)` and that the sequence is ascending.
pub fn validate_levels(credible_levels: &[f64]) -> Result<()> {
    if let Some(&level) = credible_levels
        .iter()
        .find(|&&p| p.is_nan() || p <= 0.0 || p >= 1.0)
    {
        return Err(PlotError::InvalidLevel { level });
    }
    if credible_levels.windows(2).any(|w| w[1] < w[0]) {
        return Err(PlotError::UnsortedLevels {
            levels: credible_levels.to_vec(),
        });
    }
    Ok(())
}

/// Solves one density threshold per credible level.
///
/// An all-zero histogram does not fail: it yields zero thresholds and a
/// [`Warning::DegenerateDensity`] so the consumer can skip its contours.
pub fn solve(hist: &Histogram2D, credible_levels: &[f64]) -> Result<ContourLevelSet> {
    hist.validate()?;
    validate_levels(credible_levels)?;

    let masses = &hist.values * &hist.cell_areas();
    let total: f64 = masses.sum();
    if total <= 0.0 || !total.is_finite() {
        warn!("Joint histogram holds no mass; suppressing its contours");
        return Ok(ContourLevelSet {
            levels: credible_levels.to_vec(),
            thresholds: vec![0.0; credible_levels.len()],
            warning: Some(Warning::DegenerateDensity { pair: None }),
        });
    }

    let mut cells: Vec<(f64, f64)> = hist
        .values
        .iter()
        .zip(masses.iter())
        .map(|(&density, &mass)| (density, mass / total))
        .filter(|&(density, _)| density > 0.0)
        .collect();
    cells.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));

    let mut cumulative = Vec::with_capacity(cells.len());
    let mut running = 0.0;
    for &(_, mass) in &cells {
        running += mass;
        cumulative.push(running);
    }

    // Running mass may stop a rounding error short of 1.
    let least_dense = cells.last().map_or(0.0, |c| c.0);
    let thresholds = credible_levels
        .iter()
        .map(|&p| {
            cumulative
                .iter()
                .position(|&m| m >= p - MASS_EPSILON)
                .map_or(least_dense, |k| cells[k].0)
        })
        .collect();

    Ok(ContourLevelSet {
        levels: credible_levels.to_vec(),
        thresholds,
        warning: None,
    })
}

/// Fraction of the histogram's mass in cells with density `>= threshold`.
pub fn enclosed_mass(hist: &Histogram2D, threshold: f64) -> Result<f64> {
    hist.validate()?;
    let masses = &hist.values * &hist.cell_areas();
    let total = masses.sum();
    if total <= 0.0 {
        return Ok(0.0);
    }
    let inside: f64 = hist
        .values
        .iter()
        .zip(masses.iter())
        .filter(|&(&density, _)| density >= threshold)
        .map(|(_, &mass)| mass)
        .sum();
    Ok(inside / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{histogram_2d, linear_edges};
    use crate::range::DimensionRange;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    /// Smooth, tie-free bivariate Gaussian density evaluated at cell centres.
    fn analytic_gaussian(bins: usize) -> Histogram2D {
        let range = DimensionRange::new(-4.0, 4.0).unwrap();
        let x_edges = linear_edges(range, bins);
        let y_edges = linear_edges(range, bins);
        let centre = |edges: &Array1<f64>, k: usize| 0.5 * (edges[k] + edges[k + 1]);
        let values = Array2::from_shape_fn((bins, bins), |(i, j)| {
            // off-lattice mean, so no two cells share a density
            let dx = centre(&x_edges, i) - 0.0731;
            let dy = centre(&y_edges, j) + 0.0417;
            (-0.5 * (dx * dx + 1.7 * dy * dy + 0.6 * dx * dy)).exp()
        });
        Histogram2D {
            x_edges,
            y_edges,
            values,
            normalized: false,
        }
    }

    #[test]
    fn test_thresholds_decrease_with_coverage() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let xs: Array1<f64> = (0..5_000).map(|_| normal.sample(&mut rng)).collect();
        let ys: Array1<f64> = xs.mapv(|x| 0.5 * x + normal.sample(&mut rng));
        let range = DimensionRange::new(-5.0, 5.0).unwrap();
        let hist = histogram_2d(xs.view(), ys.view(), range, range, 30).unwrap();

        let levels = [0.1, 0.39, 0.68, 0.86, 0.95, 0.99];
        let set = solve(&hist, &levels).unwrap();
        assert!(!set.is_degenerate());
        for w in set.thresholds.windows(2) {
            assert!(w[0] >= w[1], "Thresholds not nested: {:?}", set.thresholds);
        }
    }

    #[test]
    fn test_enclosed_mass_is_within_one_cell() {
        let hist = analytic_gaussian(40);
        let total = hist.mass();
        let largest_cell = (&hist.values * &hist.cell_areas())
            .iter()
            .copied()
            .fold(0.0, f64::max)
            / total;

        let levels = [0.25, 0.5, 0.68, 0.95];
        let set = solve(&hist, &levels).unwrap();
        for (&p, &t) in levels.iter().zip(set.thresholds.iter()) {
            let mass = enclosed_mass(&hist, t).unwrap();
            assert!(
                mass >= p - 1e-9 && mass <= p + largest_cell + 1e-9,
                "Level {} encloses {} (cell tolerance {})",
                p,
                mass,
                largest_cell
            );
        }
    }

    #[test]
    fn test_single_cell_mass() {
        let mut values = Array2::<f64>::zeros((10, 10));
        values[(3, 7)] = 42.0;
        let range = DimensionRange::new(0.0, 1.0).unwrap();
        let hist = Histogram2D {
            x_edges: linear_edges(range, 10),
            y_edges: linear_edges(range, 10),
            values,
            normalized: false,
        };
        let set = solve(&hist, &[0.68, 0.95]).unwrap();
        assert_eq!(set.thresholds, vec![42.0, 42.0]);
        assert_abs_diff_eq!(enclosed_mass(&hist, 42.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_histogram_degrades_to_zero_thresholds() {
        let range = DimensionRange::new(0.0, 1.0).unwrap();
        let hist = Histogram2D {
            x_edges: linear_edges(range, 5),
            y_edges: linear_edges(range, 5),
            values: Array2::zeros((5, 5)),
            normalized: false,
        };
        let set = solve(&hist, &[0.68, 0.95]).unwrap();
        assert_eq!(set.thresholds, vec![0.0, 0.0]);
        assert_eq!(set.warning, Some(Warning::DegenerateDensity { pair: None }));
        assert_eq!(set.drawable().count(), 0);
    }

    #[test]
    fn test_mismatched_grid_is_an_error() {
        let hist = Histogram2D {
            x_edges: ndarray::arr1(&[0.0, 1.0]),
            y_edges: ndarray::arr1(&[0.0, 1.0]),
            values: Array2::ones((3, 3)),
            normalized: false,
        };
        assert!(matches!(
            solve(&hist, &[0.68]),
            Err(PlotError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            enclosed_mass(&hist, 1.0),
            Err(PlotError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_unsorted_levels_are_rejected() {
        let hist = analytic_gaussian(8);
        let err = solve(&hist, &[0.95, 0.68]).unwrap_err();
        assert!(matches!(err, PlotError::UnsortedLevels { .. }));
    }

    #[test]
    fn test_levels_outside_unit_interval_are_rejected() {
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                validate_levels(&[0.5, bad]),
                Err(PlotError::InvalidLevel { .. })
            ));
        }
        assert!(validate_levels(&[]).is_ok());
        assert!(validate_levels(&[0.68, 0.68]).is_ok());
    }
}
