//! Core enums shared by the optimizer and its results.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle phase of an [`Optimizer`](crate::Optimizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// No candidate has been proposed yet.
    Initializing,
    /// Proposing enqueued or random candidates to seed the surrogate.
    Exploring,
    /// Proposing candidates that maximize the acquisition function.
    Exploiting,
    /// The call budget is spent or the run was stopped early.
    Terminated,
}

/// What to record when the objective fails or returns a non-finite value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// Stop the run with [`Error::ObjectiveEvaluation`](crate::Error::ObjectiveEvaluation).
    #[default]
    Abort,
    /// Record the given value instead.
    Penalty(f64),
    /// Record the worst value observed so far, or `default` if there is none.
    WorstObserved {
        /// Value used before anything has been observed.
        default: f64,
    },
}

/// Which strategy proposed an observed candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Source {
    /// Queued by the caller via [`Optimizer::enqueue`](crate::Optimizer::enqueue).
    Enqueued,
    /// Drawn at random during exploration.
    Random,
    /// Chosen by maximizing the acquisition function.
    Model,
}

/// Whether an observed value came from the objective.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EvaluationStatus {
    /// The objective returned the value.
    Evaluated,
    /// The objective failed and the value was substituted by the
    /// [`FailurePolicy`].
    Penalized {
        /// The objective's error message.
        reason: String,
    },
}

impl EvaluationStatus {
    /// Returns `true` for [`Penalized`](Self::Penalized).
    #[must_use]
    pub fn is_penalized(&self) -> bool {
        matches!(self, Self::Penalized { .. })
    }
}
