//! Draw plans for MCMC diagnostics: corner plots and walker traces.
//!
//! Samples go in as a [`tensor::SampleTensor`] of shape `(chains, steps, dims)`.
//! [`corner::build`] and [`trace::build`] turn them into a [`plan::DrawPlan`],
//! a plain data description of every panel that any plotting backend can render.

pub mod contour;
pub mod corner;
pub mod density;
pub mod error;
pub mod io;
pub mod plan;
pub mod range;
pub mod tensor;
pub mod trace;

pub use error::{PlotError, Result, Warning};
pub use plan::DrawPlan;
pub use tensor::SampleTensor;
