#[cfg(feature = "async")]
use core::time::Duration;
use std::collections::VecDeque;

use crate::acquisition::{Acquisition, AcquisitionOptimizer, HedgePortfolio};
use crate::error::{Error, Result};
use crate::space::SearchSpace;
use crate::surrogate::{GaussianProcess, Surrogate};
use crate::types::{FailurePolicy, Phase};

use super::{Config, Optimizer};

/// Default number of exploration evaluations.
const DEFAULT_N_INITIAL_POINTS: usize = 10;
/// Default total evaluation budget.
const DEFAULT_N_CALLS: usize = 100;

/// A builder for constructing [`Optimizer`] instances with a fluent API.
///
/// Created via [`Optimizer::builder()`].
///
/// # Defaults
///
/// - `n_initial_points`: 10
/// - `n_calls`: 100
/// - Acquisition: [`Acquisition::ei()`]
/// - Acquisition optimizer: [`AcquisitionOptimizer::default()`] (1000
///   random points, 5 local refinements)
/// - Surrogate: [`GaussianProcess::new()`] (Matérn 5/2)
/// - Seed: random
/// - Failure policy: [`FailurePolicy::Abort`]
/// - Duplicates: avoided
///
/// # Examples
///
/// ```
/// use smbo::prelude::*;
/// use smbo::surrogate::{GaussianProcess, Kernel};
///
/// let space = SearchSpace::builder()
///     .continuous("x", -2.0, 2.0)
///     .build()
///     .unwrap();
///
/// let optimizer = Optimizer::builder(space)
///     .n_initial_points(5)
///     .n_calls(30)
///     .acquisition(Acquisition::lcb())
///     .surrogate(GaussianProcess::builder().kernel(Kernel::Matern32).build())
///     .failure_policy(FailurePolicy::Penalty(1e3))
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(optimizer.n_calls(), 30);
/// ```
pub struct OptimizerBuilder {
    space: SearchSpace,
    n_initial_points: usize,
    n_calls: usize,
    acquisition: Acquisition,
    acquisition_optimizer: AcquisitionOptimizer,
    surrogate: Option<Box<dyn Surrogate>>,
    seed: Option<u64>,
    failure_policy: FailurePolicy,
    allow_duplicates: bool,
    #[cfg(feature = "async")]
    evaluation_timeout: Option<Duration>,
}

impl OptimizerBuilder {
    pub(super) fn new(space: SearchSpace) -> Self {
        Self {
            space,
            n_initial_points: DEFAULT_N_INITIAL_POINTS,
            n_calls: DEFAULT_N_CALLS,
            acquisition: Acquisition::default(),
            acquisition_optimizer: AcquisitionOptimizer::default(),
            surrogate: None,
            seed: None,
            failure_policy: FailurePolicy::default(),
            allow_duplicates: false,
            #[cfg(feature = "async")]
            evaluation_timeout: None,
        }
    }

    /// Number of enqueued or random evaluations before the surrogate takes over.
    #[must_use]
    pub fn n_initial_points(mut self, n: usize) -> Self {
        self.n_initial_points = n;
        self
    }

    /// Total number of objective evaluations.
    #[must_use]
    pub fn n_calls(mut self, n: usize) -> Self {
        self.n_calls = n;
        self
    }

    /// Set the acquisition function.
    #[must_use]
    pub fn acquisition(mut self, acquisition: Acquisition) -> Self {
        self.acquisition = acquisition;
        self
    }

    /// Set how the acquisition function is maximized.
    #[must_use]
    pub fn acquisition_optimizer(mut self, optimizer: AcquisitionOptimizer) -> Self {
        self.acquisition_optimizer = optimizer;
        self
    }

    /// Set the surrogate model.
    ///
    /// Defaults to [`GaussianProcess::new()`] if not specified.
    #[must_use]
    pub fn surrogate(mut self, surrogate: impl Surrogate + 'static) -> Self {
        self.surrogate = Some(Box::new(surrogate));
        self
    }

    /// Seed the random number generator for reproducible runs.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set what happens when the objective fails.
    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Allow proposing candidates that were already evaluated.
    ///
    /// By default the optimizer prefers unseen candidates, which matters for
    /// small discrete spaces.
    #[must_use]
    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    /// Abort any single evaluation of
    /// [`run_async`](Optimizer::run_async) after `timeout`. A timed-out
    /// evaluation is handled by the failure policy.
    #[cfg(feature = "async")]
    #[must_use]
    pub fn evaluation_timeout(mut self, timeout: Duration) -> Self {
        self.evaluation_timeout = Some(timeout);
        self
    }

    /// Validate the configuration and build the [`Optimizer`].
    ///
    /// `n_initial_points` larger than `n_calls` is clamped to `n_calls`,
    /// which turns the run into pure random search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `n_calls` or `n_initial_points`
    /// is zero, an acquisition parameter is out of range, the acquisition
    /// optimizer has a zero size, a failure-policy value is not finite, or
    /// the evaluation timeout is zero.
    pub fn build(self) -> Result<Optimizer> {
        if self.n_calls == 0 {
            return Err(Error::InvalidConfig("n_calls must be > 0".to_owned()));
        }
        if self.n_initial_points == 0 {
            return Err(Error::InvalidConfig(
                "n_initial_points must be > 0".to_owned(),
            ));
        }
        self.acquisition.validate()?;
        self.acquisition_optimizer.validate()?;
        match self.failure_policy {
            FailurePolicy::Penalty(v) | FailurePolicy::WorstObserved { default: v }
                if !v.is_finite() =>
            {
                return Err(Error::InvalidConfig(format!(
                    "failure policy value must be finite, got {v}"
                )));
            }
            _ => {}
        }
        #[cfg(feature = "async")]
        if self.evaluation_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig(
                "evaluation_timeout must be > 0".to_owned(),
            ));
        }

        let n_initial_points = if self.n_initial_points > self.n_calls {
            trace_warn!(
                n_initial_points = self.n_initial_points,
                n_calls = self.n_calls,
                "n_initial_points exceeds n_calls, clamping"
            );
            self.n_calls
        } else {
            self.n_initial_points
        };

        let hedge = match self.acquisition {
            Acquisition::Hedge { eta, xi, kappa } => Some(HedgePortfolio::new(eta, xi, kappa)),
            _ => None,
        };

        Ok(Optimizer {
            space: self.space,
            config: Config {
                n_initial_points,
                n_calls: self.n_calls,
                acquisition: self.acquisition,
                acquisition_optimizer: self.acquisition_optimizer,
                failure_policy: self.failure_policy,
                allow_duplicates: self.allow_duplicates,
                #[cfg(feature = "async")]
                evaluation_timeout: self.evaluation_timeout,
            },
            surrogate: self
                .surrogate
                .unwrap_or_else(|| Box::new(GaussianProcess::new())),
            rng: self
                .seed
                .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            history: Vec::new(),
            phase: Phase::Initializing,
            enqueued: VecDeque::new(),
            pending: None,
            hedge,
        })
    }
}
