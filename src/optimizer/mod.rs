//! The sequential model-based optimization driver.
//!
//! An [`Optimizer`] moves through four [`Phase`]s:
//!
//! 1. `Initializing`: built, nothing proposed yet.
//! 2. `Exploring`: the first `n_initial_points` proposals are enqueued
//!    candidates (FIFO) and then random draws from the space's priors.
//! 3. `Exploiting`: the surrogate is refitted on the full history and the
//!    acquisition function is maximized to choose each proposal.
//! 4. `Terminated`: `n_calls` observations are recorded or the objective
//!    asked to stop.
//!
//! Drive it either with [`run`](Optimizer::run) or manually with
//! [`ask`](Optimizer::ask) and [`tell`](Optimizer::tell):
//!
//! ```
//! use smbo::prelude::*;
//!
//! let space = SearchSpace::builder().discrete("k", 1, 10).build().unwrap();
//! let mut optimizer = Optimizer::builder(space)
//!     .n_initial_points(3)
//!     .n_calls(6)
//!     .seed(0)
//!     .build()
//!     .unwrap();
//!
//! while let Ok(candidate) = optimizer.ask() {
//!     let k = candidate.int("k").unwrap();
//!     optimizer.tell(candidate, Ok::<_, String>(((k - 7) * (k - 7)) as f64)).unwrap();
//! }
//!
//! assert_eq!(optimizer.phase(), Phase::Terminated);
//! assert_eq!(optimizer.n_evaluations(), 6);
//! ```

#[cfg(feature = "async")]
use core::time::Duration;
use std::collections::VecDeque;

use crate::acquisition::{
    self, Acquisition, AcquisitionFunction, AcquisitionOptimizer, HedgePortfolio, Scored,
};
use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::space::SearchSpace;
use crate::surrogate::Surrogate;
use crate::types::{EvaluationStatus, FailurePolicy, Phase, Source};

mod builder;
mod optimize;
mod result;

#[cfg(feature = "async")]
mod async_impl;

pub use builder::OptimizerBuilder;
pub use result::{Observation, OptimizeResult};

/// Random re-draws attempted before a duplicate proposal is accepted.
const MAX_DUPLICATE_RETRIES: usize = 100;

/// Validated run settings.
#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) n_initial_points: usize,
    pub(crate) n_calls: usize,
    pub(crate) acquisition: Acquisition,
    pub(crate) acquisition_optimizer: AcquisitionOptimizer,
    pub(crate) failure_policy: FailurePolicy,
    pub(crate) allow_duplicates: bool,
    #[cfg(feature = "async")]
    pub(crate) evaluation_timeout: Option<Duration>,
}

/// Sequential model-based optimizer over a [`SearchSpace`].
///
/// Owns the observation history and the surrogate for the duration of
/// one run; all mutation goes through `&mut self`.
///
/// # Examples
///
/// ```
/// use smbo::prelude::*;
///
/// let space = SearchSpace::builder()
///     .continuous("x", -5.0, 5.0)
///     .build()
///     .unwrap();
///
/// let mut optimizer = Optimizer::builder(space)
///     .n_initial_points(4)
///     .n_calls(12)
///     .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 200 })
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let result = optimizer
///     .run(|c: &Candidate| {
///         let x = c.float("x").unwrap();
///         Ok::<_, Error>((x - 1.0).powi(2))
///     })
///     .unwrap();
///
/// assert_eq!(result.n_evaluations(), 12);
/// assert!(result.best_value().unwrap() < 1.0);
/// ```
pub struct Optimizer {
    pub(crate) space: SearchSpace,
    pub(crate) config: Config,
    pub(crate) surrogate: Box<dyn Surrogate>,
    pub(crate) rng: fastrand::Rng,
    pub(crate) history: Vec<Observation>,
    pub(crate) phase: Phase,
    /// Caller-supplied candidates, evaluated before anything else.
    pub(crate) enqueued: VecDeque<Candidate>,
    /// The last proposal of [`ask`](Optimizer::ask) and who made it.
    pub(crate) pending: Option<(Candidate, Source)>,
    pub(crate) hedge: Option<HedgePortfolio>,
}

impl Optimizer {
    /// Return an [`OptimizerBuilder`] for `space`.
    #[must_use]
    pub fn builder(space: SearchSpace) -> OptimizerBuilder {
        OptimizerBuilder::new(space)
    }

    /// Create an optimizer with default settings.
    ///
    /// # Errors
    ///
    /// Never fails with the defaults; the signature mirrors
    /// [`OptimizerBuilder::build`].
    pub fn new(space: SearchSpace) -> Result<Self> {
        Self::builder(space).build()
    }

    /// The search space being explored.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// The current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// All observations so far, in evaluation order.
    #[must_use]
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    /// Number of recorded observations.
    #[must_use]
    pub fn n_evaluations(&self) -> usize {
        self.history.len()
    }

    /// Total evaluation budget.
    #[must_use]
    pub fn n_calls(&self) -> usize {
        self.config.n_calls
    }

    /// Number of exploration evaluations, after clamping to `n_calls`.
    #[must_use]
    pub fn n_initial_points(&self) -> usize {
        self.config.n_initial_points
    }

    /// The surrogate as of the last model-guided proposal.
    #[must_use]
    pub fn surrogate(&self) -> &dyn Surrogate {
        self.surrogate.as_ref()
    }

    /// The best observation so far, earliest first on ties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] if nothing was evaluated yet.
    pub fn best(&self) -> Result<&Observation> {
        result::best_of(&self.history).ok_or(Error::NoObservations)
    }

    /// A snapshot of the history as an [`OptimizeResult`].
    #[must_use]
    pub fn result(&self) -> OptimizeResult {
        OptimizeResult::new(self.history.clone(), self.space.clone())
    }

    /// Queue a candidate to be evaluated before any generated proposal.
    ///
    /// Enqueued candidates are proposed in FIFO order and recorded with
    /// [`Source::Enqueued`]. They count towards `n_initial_points` while
    /// exploring.
    ///
    /// # Errors
    ///
    /// Returns the [`SearchSpace::validate`] error if `candidate` does not
    /// belong to the space, or [`Error::Terminated`] after the run ended.
    ///
    /// # Examples
    ///
    /// ```
    /// use smbo::prelude::*;
    ///
    /// let space = SearchSpace::builder().continuous("x", 0.0, 1.0).build().unwrap();
    /// let mut optimizer = Optimizer::builder(space.clone()).seed(1).build().unwrap();
    ///
    /// let warm_start = space.candidate(vec![ParamValue::Float(0.25)]).unwrap();
    /// optimizer.enqueue(warm_start.clone()).unwrap();
    /// assert_eq!(optimizer.ask().unwrap(), warm_start);
    /// ```
    pub fn enqueue(&mut self, candidate: Candidate) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(Error::Terminated);
        }
        self.space.validate(&candidate)?;
        self.enqueued.push_back(candidate);
        Ok(())
    }

    /// Propose the next candidate to evaluate.
    ///
    /// Calling `ask` again before [`tell`](Self::tell) discards the
    /// previous proposal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Terminated`] once `n_calls` observations were
    /// recorded or the run was stopped early.
    pub fn ask(&mut self) -> Result<Candidate> {
        if self.phase == Phase::Terminated {
            return Err(Error::Terminated);
        }
        let n = self.history.len();
        if n < self.config.n_initial_points {
            self.set_phase(Phase::Exploring);
        } else {
            self.set_phase(Phase::Exploiting);
        }

        let (candidate, source) = if let Some(candidate) = self.enqueued.pop_front() {
            (candidate, Source::Enqueued)
        } else if n < self.config.n_initial_points {
            (self.random_candidate(), Source::Random)
        } else {
            (self.model_candidate(), Source::Model)
        };

        trace_debug!(index = n, source = ?source, candidate = %candidate, "proposed candidate");
        self.pending = Some((candidate.clone(), source));
        Ok(candidate)
    }

    /// Record the outcome of evaluating `candidate`.
    ///
    /// A failed evaluation (an `Err` or a non-finite value) is handled by the
    /// configured [`FailurePolicy`]. Candidates that were not proposed by
    /// the preceding [`ask`](Self::ask) are recorded as
    /// [`Source::Enqueued`].
    ///
    /// # Errors
    ///
    /// - [`Error::Terminated`] after the run ended.
    /// - The [`SearchSpace::validate`] error if `candidate` is not in the space.
    /// - [`Error::ObjectiveEvaluation`] if the evaluation failed and the
    ///   policy is [`FailurePolicy::Abort`]. Nothing is recorded then.
    pub fn tell<E: ToString>(
        &mut self,
        candidate: Candidate,
        outcome: core::result::Result<f64, E>,
    ) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(Error::Terminated);
        }
        self.space.validate(&candidate)?;

        let index = self.history.len();
        let outcome = match outcome {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(value) => Err(format!("objective returned non-finite value {value}")),
            Err(e) => Err(e.to_string()),
        };

        let (value, status) = match outcome {
            Ok(value) => (value, EvaluationStatus::Evaluated),
            Err(message) => {
                let value = match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        trace_warn!(index, error = %message, "objective failed, aborting");
                        return Err(Error::ObjectiveEvaluation { index, message });
                    }
                    FailurePolicy::Penalty(value) => value,
                    FailurePolicy::WorstObserved { default } => {
                        self.worst_evaluated().unwrap_or(default)
                    }
                };
                trace_warn!(index, error = %message, penalty = value, "objective failed, recording penalty");
                (value, EvaluationStatus::Penalized { reason: message })
            }
        };

        let source = self
            .pending
            .take()
            .filter(|(proposed, _)| *proposed == candidate)
            .map_or(Source::Enqueued, |(_, source)| source);

        let improved = result::best_of(&self.history).is_none_or(|b| value < b.value);
        self.history.push(Observation {
            candidate,
            value,
            source,
            status,
        });
        trace_info!(index, value, "evaluation recorded");
        if improved {
            trace_info!(index, value, "new best value found");
        }

        if self.history.len() >= self.config.n_calls {
            self.set_phase(Phase::Terminated);
        }
        Ok(())
    }

    /// Stop the run; further [`ask`](Self::ask) calls fail with
    /// [`Error::Terminated`].
    pub fn terminate(&mut self) {
        self.set_phase(Phase::Terminated);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            trace_info!(from = ?self.phase, to = ?phase, "phase transition");
            self.phase = phase;
        }
    }

    /// Largest value among objective-evaluated observations.
    fn worst_evaluated(&self) -> Option<f64> {
        self.history
            .iter()
            .filter(|o| !o.status.is_penalized())
            .map(|o| o.value)
            .reduce(f64::max)
    }

    fn is_seen(&self, candidate: &Candidate) -> bool {
        self.history.iter().any(|o| o.candidate == *candidate)
    }

    /// A random draw, re-drawn a bounded number of times to avoid
    /// already-evaluated candidates unless duplicates are allowed.
    fn random_candidate(&mut self) -> Candidate {
        let mut candidate = self.space.sample_one(&mut self.rng);
        if self.config.allow_duplicates {
            return candidate;
        }
        for _ in 0..MAX_DUPLICATE_RETRIES {
            if !self.is_seen(&candidate) {
                return candidate;
            }
            candidate = self.space.sample_one(&mut self.rng);
        }
        if self.is_seen(&candidate) {
            trace_warn!(candidate = %candidate, "no unseen random candidate found, accepting a duplicate");
        }
        candidate
    }

    /// Refit the surrogate and maximize the acquisition function.
    fn model_candidate(&mut self) -> Candidate {
        let x: Vec<Vec<f64>> = self
            .history
            .iter()
            .map(|o| self.space.encode(&o.candidate))
            .collect();
        let y: Vec<f64> = self.history.iter().map(|o| o.value).collect();
        match self.surrogate.fit(&x, &y) {
            Ok(()) => {}
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            Err(e) => {
                trace_warn!(error = %e, "surrogate fit failed, using the prior");
            }
        }
        let f_best = y.iter().copied().fold(f64::INFINITY, f64::min);

        match self.config.acquisition {
            Acquisition::Hedge { .. } => self.hedge_candidate(f_best),
            acquisition => {
                let scored = self.maximize(acquisition, f_best);
                self.pick_unseen(scored)
            }
        }
    }

    fn maximize(&mut self, acquisition: Acquisition, f_best: f64) -> Vec<Scored> {
        let surrogate = self.surrogate.as_ref();
        acquisition::maximize(
            &self.space,
            self.config.acquisition_optimizer,
            |x| acquisition.score_at(x, surrogate, f_best),
            &mut self.rng,
        )
    }

    /// Every portfolio member proposes its maximizer and one proposal is
    /// drawn by softmax over the members' gains.
    fn hedge_candidate(&mut self, f_best: f64) -> Candidate {
        let Some(mut hedge) = self.hedge.take() else {
            let scored = self.maximize(Acquisition::ei(), f_best);
            return self.pick_unseen(scored);
        };
        hedge.update(self.surrogate.as_ref());

        let members = *hedge.members();
        let proposals = members.map(|member| {
            let scored = self.maximize(member, f_best);
            self.pick_unseen(scored)
        });
        hedge.record(proposals.clone().map(|c| self.space.encode(&c)));

        let chosen = hedge.choose(&mut self.rng);
        trace_debug!(member = ?members[chosen], probabilities = ?hedge.probabilities(), "hedge selected member");
        self.hedge = Some(hedge);

        let [ei, pi, lcb] = proposals;
        match chosen {
            0 => ei,
            1 => pi,
            _ => lcb,
        }
    }

    /// The best-scored candidate not evaluated yet; failing that, an unseen
    /// random draw; failing that, the best-scored duplicate.
    fn pick_unseen(&mut self, scored: Vec<Scored>) -> Candidate {
        if self.config.allow_duplicates
            && let Some(best) = scored.first()
        {
            return best.candidate.clone();
        }
        if let Some(unseen) = scored.iter().find(|s| !self.is_seen(&s.candidate)) {
            return unseen.candidate.clone();
        }

        trace_debug!("all scored candidates were already evaluated, drawing at random");
        for _ in 0..MAX_DUPLICATE_RETRIES {
            let candidate = self.space.sample_one(&mut self.rng);
            if !self.is_seen(&candidate) {
                return candidate;
            }
        }

        trace_warn!("no unseen candidate found, accepting a duplicate");
        match scored.into_iter().next() {
            Some(best) => best.candidate,
            None => self.space.sample_one(&mut self.rng),
        }
    }
}

impl core::fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Optimizer")
            .field("space", &self.space)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("n_evaluations", &self.history.len())
            .field("n_enqueued", &self.enqueued.len())
            .finish_non_exhaustive()
    }
}
