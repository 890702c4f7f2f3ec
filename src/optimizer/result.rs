//! Observations and the outcome of a run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::space::SearchSpace;
use crate::types::{EvaluationStatus, Source};

/// One evaluated candidate in the optimizer's history.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// The evaluated point.
    pub candidate: Candidate,
    /// The recorded objective value (lower is better).
    pub value: f64,
    /// Which strategy proposed the point.
    pub source: Source,
    /// Whether `value` came from the objective or the failure policy.
    pub status: EvaluationStatus,
}

/// The observation with the lowest value; ties go to the earliest one.
pub(crate) fn best_of(history: &[Observation]) -> Option<&Observation> {
    history.iter().fold(None, |best: Option<&Observation>, o| match best {
        Some(b) if b.value <= o.value => Some(b),
        _ => Some(o),
    })
}

/// Complete history of a run together with the space it explored.
///
/// The best observation is derived from the history on demand.
///
/// # Examples
///
/// ```
/// use smbo::prelude::*;
///
/// let space = SearchSpace::builder().discrete("n", 0, 20).build().unwrap();
/// let mut optimizer = Optimizer::builder(space)
///     .n_initial_points(6)
///     .n_calls(6)
///     .seed(3)
///     .build()
///     .unwrap();
/// let result = optimizer
///     .run(|c: &Candidate| Ok::<_, Error>((c.int("n").unwrap() - 10).abs() as f64))
///     .unwrap();
///
/// let trace = result.convergence();
/// assert_eq!(trace.len(), 6);
/// assert_eq!(*trace.last().unwrap(), result.best_value().unwrap());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizeResult {
    history: Vec<Observation>,
    space: SearchSpace,
}

impl OptimizeResult {
    pub(crate) fn new(history: Vec<Observation>, space: SearchSpace) -> Self {
        Self { history, space }
    }

    /// All observations in evaluation order.
    #[must_use]
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    /// The search space the run explored.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Number of recorded observations.
    #[must_use]
    pub fn n_evaluations(&self) -> usize {
        self.history.len()
    }

    /// The observation with the lowest value, earliest first on ties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] if the history is empty.
    pub fn best(&self) -> Result<&Observation> {
        best_of(&self.history).ok_or(Error::NoObservations)
    }

    /// The candidate of [`best`](Self::best).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] if the history is empty.
    pub fn best_candidate(&self) -> Result<&Candidate> {
        self.best().map(|o| &o.candidate)
    }

    /// The value of [`best`](Self::best).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] if the history is empty.
    pub fn best_value(&self) -> Result<f64> {
        self.best().map(|o| o.value)
    }

    /// Best value seen after each evaluation.
    #[must_use]
    pub fn convergence(&self) -> Vec<f64> {
        self.history
            .iter()
            .scan(f64::INFINITY, |best, o| {
                *best = best.min(o.value);
                Some(*best)
            })
            .collect()
    }

    /// Consumes the result, returning the history.
    #[must_use]
    pub fn into_history(self) -> Vec<Observation> {
        self.history
    }
}
