//! Acquisition functions: how promising is it to evaluate a point next?
//!
//! Every acquisition function maps the surrogate's [`Prediction`] at a
//! point, together with the best value observed so far, to a score where
//! **higher is better**. The optimizer evaluates the objective where the
//! score is maximal.
//!
//! | Variant | Score | Leans towards |
//! |---------|-------|---------------|
//! | [`ExpectedImprovement`] | `E[max(f_best - ξ - f(x), 0)]` | balanced (default) |
//! | [`ProbabilityOfImprovement`] | `P(f(x) < f_best - ξ)` | exploitation |
//! | [`LowerConfidenceBound`] | `κ σ(x) - μ(x)` | exploration for large `κ` |
//! | [`Acquisition::Hedge`] | portfolio of the three above | robustness |
//!
//! # Examples
//!
//! ```
//! use smbo::acquisition::{AcquisitionFunction, ExpectedImprovement};
//! use smbo::surrogate::Prediction;
//!
//! let ei = ExpectedImprovement { xi: 0.0 };
//! let promising = ei.score(Prediction { mean: 0.5, std: 0.2 }, 1.0);
//! let hopeless = ei.score(Prediction { mean: 3.0, std: 0.0 }, 1.0);
//! assert!(promising > 0.4);
//! assert_eq!(hopeless, 0.0);
//! ```

mod hedge;
mod search;

pub(crate) use hedge::HedgePortfolio;
pub(crate) use search::{Scored, maximize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normal;
use crate::surrogate::{Prediction, Surrogate};

/// Default exploration margin for EI and PI.
const DEFAULT_XI: f64 = 0.01;
/// Default confidence multiplier for LCB.
const DEFAULT_KAPPA: f64 = 1.96;
/// Default learning rate of the hedge portfolio.
const DEFAULT_ETA: f64 = 1.0;
/// Default number of random points scored per proposal.
const DEFAULT_N_POINTS: usize = 1000;
/// Default number of local refinements per proposal.
const DEFAULT_N_RESTARTS: usize = 5;

/// A scoring rule over the surrogate's posterior. Higher is better.
pub trait AcquisitionFunction {
    /// Scores a posterior prediction against the best observed value.
    fn score(&self, prediction: Prediction, f_best: f64) -> f64;

    /// Scores the encoded point `x` under `surrogate`.
    fn score_at(&self, x: &[f64], surrogate: &dyn Surrogate, f_best: f64) -> f64 {
        self.score(surrogate.predict(x), f_best)
    }
}

/// Expected Improvement over `f_best - xi`.
///
/// `EI = σ (z Φ(z) + φ(z))` with `z = (f_best - xi - μ) / σ`; zero when
/// `σ = 0`. Never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpectedImprovement {
    /// Minimum improvement considered worthwhile.
    pub xi: f64,
}

impl AcquisitionFunction for ExpectedImprovement {
    fn score(&self, p: Prediction, f_best: f64) -> f64 {
        if p.std <= 0.0 {
            return 0.0;
        }
        let improvement = f_best - self.xi - p.mean;
        let z = improvement / p.std;
        (improvement * normal::cdf(z) + p.std * normal::pdf(z)).max(0.0)
    }
}

/// Probability of improving on `f_best - xi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbabilityOfImprovement {
    /// Minimum improvement considered worthwhile.
    pub xi: f64,
}

impl AcquisitionFunction for ProbabilityOfImprovement {
    fn score(&self, p: Prediction, f_best: f64) -> f64 {
        let improvement = f_best - self.xi - p.mean;
        if p.std <= 0.0 {
            return if improvement > 0.0 { 1.0 } else { 0.0 };
        }
        normal::cdf(improvement / p.std)
    }
}

/// Negated lower confidence bound, `κ σ - μ`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LowerConfidenceBound {
    /// Weight of the uncertainty term.
    pub kappa: f64,
}

impl AcquisitionFunction for LowerConfidenceBound {
    fn score(&self, p: Prediction, _f_best: f64) -> f64 {
        self.kappa * p.std - p.mean
    }
}

/// Acquisition strategy used by the [`Optimizer`](crate::Optimizer).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Acquisition {
    /// Expected Improvement (the default, `xi = 0.01`).
    ExpectedImprovement {
        /// Exploration margin.
        xi: f64,
    },
    /// Probability of Improvement.
    ProbabilityOfImprovement {
        /// Exploration margin.
        xi: f64,
    },
    /// Lower Confidence Bound.
    LowerConfidenceBound {
        /// Uncertainty weight.
        kappa: f64,
    },
    /// GP-Hedge: each step, EI, PI and LCB each propose a point and one of
    /// the proposals is picked with probability `softmax(eta * gains)`.
    /// A member's gain drops by the refitted posterior mean at its last
    /// proposal, so members whose proposals look good gain weight.
    Hedge {
        /// Softmax temperature; larger values favour the leader.
        eta: f64,
        /// Margin for the EI and PI members.
        xi: f64,
        /// Uncertainty weight for the LCB member.
        kappa: f64,
    },
}

impl Acquisition {
    /// Expected Improvement with the default margin.
    #[must_use]
    pub fn ei() -> Self {
        Self::ExpectedImprovement { xi: DEFAULT_XI }
    }

    /// Probability of Improvement with the default margin.
    #[must_use]
    pub fn pi() -> Self {
        Self::ProbabilityOfImprovement { xi: DEFAULT_XI }
    }

    /// Lower Confidence Bound with the default `kappa`.
    #[must_use]
    pub fn lcb() -> Self {
        Self::LowerConfidenceBound {
            kappa: DEFAULT_KAPPA,
        }
    }

    /// GP-Hedge portfolio with default parameters.
    #[must_use]
    pub fn hedge() -> Self {
        Self::Hedge {
            eta: DEFAULT_ETA,
            xi: DEFAULT_XI,
            kappa: DEFAULT_KAPPA,
        }
    }

    /// Checks that the parameters are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] on a negative or non-finite `xi` or
    /// `kappa`, or a non-positive `eta`.
    pub fn validate(&self) -> Result<()> {
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!(
                    "acquisition parameter {name} must be finite and >= 0, got {v}"
                )))
            }
        };
        match *self {
            Self::ExpectedImprovement { xi } | Self::ProbabilityOfImprovement { xi } => {
                non_negative("xi", xi)
            }
            Self::LowerConfidenceBound { kappa } => non_negative("kappa", kappa),
            Self::Hedge { eta, xi, kappa } => {
                if !(eta.is_finite() && eta > 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "hedge eta must be finite and > 0, got {eta}"
                    )));
                }
                non_negative("xi", xi)?;
                non_negative("kappa", kappa)
            }
        }
    }
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::ei()
    }
}

/// A single acquisition function is used directly; `Hedge` scores like its
/// EI member when called outside the optimizer.
impl AcquisitionFunction for Acquisition {
    fn score(&self, prediction: Prediction, f_best: f64) -> f64 {
        match *self {
            Self::ExpectedImprovement { xi } | Self::Hedge { xi, .. } => {
                ExpectedImprovement { xi }.score(prediction, f_best)
            }
            Self::ProbabilityOfImprovement { xi } => {
                ProbabilityOfImprovement { xi }.score(prediction, f_best)
            }
            Self::LowerConfidenceBound { kappa } => {
                LowerConfidenceBound { kappa }.score(prediction, f_best)
            }
        }
    }
}

/// How the acquisition function is maximized over the search space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AcquisitionOptimizer {
    /// Score `n_points` random candidates and keep the best.
    Sampling {
        /// Number of random candidates.
        n_points: usize,
    },
    /// Like `Sampling`, then refine the `n_restarts` best candidates with a
    /// shrinking compass search in the encoded unit cube.
    LocalSearch {
        /// Number of random candidates.
        n_points: usize,
        /// Number of candidates to refine.
        n_restarts: usize,
    },
}

impl AcquisitionOptimizer {
    /// Checks that the sizes are positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `n_points` or `n_restarts` is zero.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Sampling { n_points } | Self::LocalSearch { n_points, .. } if n_points == 0 => {
                Err(Error::InvalidConfig("n_points must be > 0".to_owned()))
            }
            Self::LocalSearch { n_restarts: 0, .. } => {
                Err(Error::InvalidConfig("n_restarts must be > 0".to_owned()))
            }
            _ => Ok(()),
        }
    }
}

impl Default for AcquisitionOptimizer {
    fn default() -> Self {
        Self::LocalSearch {
            n_points: DEFAULT_N_POINTS,
            n_restarts: DEFAULT_N_RESTARTS,
        }
    }
}
