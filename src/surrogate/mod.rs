//! Surrogate models of the objective's response surface.
//!
//! A surrogate is a cheap regression model fitted on the encoded
//! observation history. It predicts a mean and an uncertainty at unseen
//! points, which the [acquisition function](crate::acquisition) turns into
//! a score.
//!
//! The built-in surrogate is [`GaussianProcess`]; implement [`Surrogate`]
//! to plug in another model via
//! [`OptimizerBuilder::surrogate`](crate::optimizer::OptimizerBuilder::surrogate).

mod gp;
mod kernel;

pub use gp::{GaussianProcess, GaussianProcessBuilder, Hyperparameters};
pub use kernel::Kernel;

use crate::error::Result;

/// Posterior predictive distribution at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    /// Posterior mean, in objective units.
    pub mean: f64,
    /// Posterior standard deviation, in objective units. Never negative.
    pub std: f64,
}

/// A regression model over the numeric encoding of a search space.
///
/// Implementations are refitted from scratch on the full (encoded)
/// history before every model-guided proposal.
pub trait Surrogate: Send {
    /// Rebuilds the model from `x` (one encoded point per row) and `y`.
    ///
    /// Fitting zero points leaves the model in its prior state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurrogateFit`](crate::Error::SurrogateFit) if the
    /// data is malformed or degenerate. The model must then be left in a
    /// usable prior state so that [`predict`](Self::predict) still works.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predicts mean and standard deviation at an encoded point.
    fn predict(&self, x: &[f64]) -> Prediction;

    /// Returns `true` if the last [`fit`](Self::fit) produced a data-driven model.
    fn is_fitted(&self) -> bool;
}
