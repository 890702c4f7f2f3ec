#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a search space is empty or one of its dimensions is malformed.
    #[error("invalid search space: {0}")]
    InvalidSearchSpace(String),

    /// Returned when the optimizer configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when a candidate value lies outside its dimension's domain.
    #[error("value for dimension '{dimension}' is out of domain: {reason}")]
    CandidateOutOfDomain {
        /// The name of the offending dimension.
        dimension: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when a candidate or numeric vector has the wrong length.
    #[error("dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch {
        /// The expected number of values.
        expected: usize,
        /// The actual number of values.
        got: usize,
    },

    /// Returned when the objective fails and the failure policy is to abort.
    #[error("objective evaluation {index} failed: {message}")]
    ObjectiveEvaluation {
        /// Zero-based index of the evaluation in the run's history.
        index: usize,
        /// The error reported by the objective.
        message: String,
    },

    /// Returned when the surrogate cannot be fitted to the observations.
    ///
    /// The optimizer recovers from this by falling back to the prior.
    #[error("surrogate fit failed: {0}")]
    SurrogateFit(String),

    /// Returned when asking for a new candidate after the call budget is spent.
    #[error("optimization already terminated")]
    Terminated,

    /// Returned when requesting the best observation of an empty history.
    #[error("no observations recorded")]
    NoObservations,

    /// Returned when an async evaluation task fails to join.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),
}

pub type Result<T> = core::result::Result<T, Error>;
