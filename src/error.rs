//! Error and warning types shared by every stage of the plotting pipeline.
//!
//! Structural problems with the input (shape, labels, ranges, levels) are
//! [`PlotError`]s and abort the whole call. Cosmetic degeneracies that only
//! affect a single panel are reported as [`Warning`]s instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias used by all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    /// An explicit `(low, high)` pair that does not satisfy `low < high`.
    #[error("invalid range ({low}, {high}): low must be strictly below high")]
    InvalidRange { low: f64, high: f64 },

    /// A dimension whose samples are all equal, with no override to fall back on.
    #[error("dimension has zero spread (every sample is {value}); supply an explicit range")]
    DegenerateRange { value: f64 },

    #[error("{what}: expected {expected} entries, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("credible levels must be sorted ascending, got {levels:?}")]
    UnsortedLevels { levels: Vec<f64> },

    #[error("credible level {level} lies outside the open interval (0, 1)")]
    InvalidLevel { level: f64 },

    #[error("bin count must be at least 1")]
    InvalidBinCount,

    #[error("sample axis `{axis}` has length 0")]
    EmptyAxis { axis: &'static str },

    #[error("ragged samples: {0}")]
    RaggedSamples(String),

    #[error("non-finite sample at chain {chain}, step {step}, dimension {dim}")]
    NonFiniteSample { chain: usize, step: usize, dim: usize },

    #[error("range override for dimension {index}, but samples only have {n_dims} dimensions")]
    UnknownDimension { index: usize, n_dims: usize },

    #[error(transparent)]
    Stats(#[from] ndarray_stats::errors::MinMaxError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[cfg(feature = "csv")]
    #[error("could not parse sample file: {0}")]
    Parse(String),
}

/// Non-fatal conditions collected while building a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// A joint histogram held no mass inside its ranges, so its contours are
    /// suppressed (every threshold is zero). `pair` is `(x_dim, y_dim)` once
    /// the histogram has been placed in a corner grid.
    DegenerateDensity { pair: Option<(usize, usize)> },
}

impl Warning {
    /// Tags the warning with the dimension pair of the panel it came from.
    pub fn for_pair(self, x_dim: usize, y_dim: usize) -> Self {
        match self {
            Warning::DegenerateDensity { .. } => Warning::DegenerateDensity {
                pair: Some((x_dim, y_dim)),
            },
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DegenerateDensity {
                pair: Some((x_dim, y_dim)),
            } => write!(
                f,
                "joint density of dimensions ({x_dim}, {y_dim}) is degenerate; contours omitted"
            ),
            Warning::DegenerateDensity { pair: None } => {
                write!(f, "joint density is degenerate; contours omitted")
            }
        }
    }
}
