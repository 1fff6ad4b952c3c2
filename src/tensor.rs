/*!
A validated, immutable container for MCMC samples laid out as
**chain × step × dimension**.

Every pipeline in this crate starts from a [`SampleTensor`]. Construction checks
that no axis is empty, that chains are not ragged and that every value is finite,
so downstream code can index freely.

# Examples

```rust
use mcmc_corner::tensor::SampleTensor;

// 2 chains, 3 steps, 2 dimensions.
let data = vec![
    vec![vec![0.0, 1.0], vec![0.5, 1.5], vec![1.0, 2.0]],
    vec![vec![0.1, 1.1], vec![0.6, 1.6], vec![1.1, 2.1]],
];
let samples = SampleTensor::from_nested(&data)?;
assert_eq!(samples.shape(), (2, 3, 2));
assert_eq!(samples.flat_dim(1).len(), 6);
# Ok::<(), mcmc_corner::error::PlotError>(())
```
*/

use ndarray::{Array1, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use num_traits::ToPrimitive;

use crate::error::{PlotError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleTensor {
    data: Array3<f64>,
}

impl SampleTensor {
    /// Wraps an existing `(chains, steps, dims)` array after validating it.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let (n_chains, n_steps, n_dims) = data.dim();
        for (len, axis) in [(n_chains, "chain"), (n_steps, "step"), (n_dims, "dimension")] {
            if len == 0 {
                return Err(PlotError::EmptyAxis { axis });
            }
        }
        if let Some(((chain, step, dim), _)) =
            data.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(PlotError::NonFiniteSample { chain, step, dim });
        }
        Ok(Self { data })
    }

    /// Converts an array of any primitive numeric type into `f64` samples.
    pub fn from_array<T: ToPrimitive>(data: &Array3<T>) -> Result<Self> {
        let mut out = Array3::<f64>::zeros(data.dim());
        for ((chain, step, dim), v) in data.indexed_iter() {
            out[(chain, step, dim)] = v
                .to_f64()
                .ok_or(PlotError::NonFiniteSample { chain, step, dim })?;
        }
        Self::new(out)
    }

    /// Builds a tensor from nested vectors indexed as `data[chain][step][dim]`.
    ///
    /// Chains of different length, or steps of different dimensionality, are
    /// rejected rather than truncated.
    pub fn from_nested<T: Into<f64> + Copy>(data: &[Vec<Vec<T>>]) -> Result<Self> {
        let n_chains = data.len();
        let n_steps = data.first().map_or(0, |c| c.len());
        let n_dims = data
            .first()
            .and_then(|c| c.first())
            .map_or(0, |s| s.len());

        for (chain_idx, chain) in data.iter().enumerate() {
            if chain.len() != n_steps {
                return Err(PlotError::RaggedSamples(format!(
                    "chain {chain_idx} has {} steps, chain 0 has {n_steps}",
                    chain.len()
                )));
            }
            for (step_idx, sample) in chain.iter().enumerate() {
                if sample.len() != n_dims {
                    return Err(PlotError::RaggedSamples(format!(
                        "chain {chain_idx}, step {step_idx} has {} dimensions, expected {n_dims}",
                        sample.len()
                    )));
                }
            }
        }

        let flat: Vec<f64> = data
            .iter()
            .flat_map(|chain| chain.iter().flat_map(|s| s.iter().map(|&v| v.into())))
            .collect();
        Self::from_shape_vec((n_chains, n_steps, n_dims), flat)
    }

    /// Builds a tensor from a row-major buffer of `chains * steps * dims` values.
    pub fn from_shape_vec(shape: (usize, usize, usize), values: Vec<f64>) -> Result<Self> {
        let expected = shape.0 * shape.1 * shape.2;
        if values.len() != expected {
            return Err(PlotError::DimensionMismatch {
                what: "sample buffer",
                expected,
                got: values.len(),
            });
        }
        let data = Array3::from_shape_vec(shape, values)
            .map_err(|e| PlotError::RaggedSamples(e.to_string()))?;
        Self::new(data)
    }

    /// `(chains, steps, dims)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn n_chains(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_steps(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn n_dims(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// All samples of dimension `dim` as a `(chains, steps)` view.
    ///
    /// # Panics
    /// If `dim >= self.n_dims()`.
    pub fn dim(&self, dim: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), dim)
    }

    /// One chain's trajectory through dimension `dim`, ordered by step.
    pub fn chain(&self, chain: usize, dim: usize) -> ArrayView1<'_, f64> {
        self.data.index_axis(Axis(0), chain).index_axis_move(Axis(1), dim)
    }

    /// Samples of dimension `dim` pooled over chains, in chain-major order.
    /// Chain boundaries carry no meaning for density estimation.
    pub fn flat_dim(&self, dim: usize) -> Array1<f64> {
        self.dim(dim).iter().copied().collect()
    }

    pub fn into_inner(self) -> Array3<f64> {
        self.data
    }
}
