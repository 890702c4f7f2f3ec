//! The [`Objective`] trait defines what gets minimized.
//!
//! For simple closures, pass them directly to
//! [`Optimizer::run`](crate::Optimizer::run):
//!
//! ```
//! use smbo::prelude::*;
//!
//! let space = SearchSpace::builder().continuous("x", -5.0, 5.0).build().unwrap();
//! let mut optimizer = Optimizer::builder(space)
//!     .n_initial_points(5)
//!     .n_calls(8)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//!
//! let result = optimizer
//!     .run(|c: &Candidate| Ok::<_, Error>(c.float("x").unwrap().powi(2)))
//!     .unwrap();
//! assert_eq!(result.n_evaluations(), 8);
//! ```
//!
//! For early stopping, implement [`Objective`] on a struct and override
//! [`after_evaluation`](Objective::after_evaluation):
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use smbo::prelude::*;
//!
//! struct StopBelow {
//!     target: f64,
//! }
//!
//! impl Objective for StopBelow {
//!     type Error = Error;
//!
//!     fn evaluate(&self, candidate: &Candidate) -> Result<f64> {
//!         Ok((candidate.float("x").unwrap() - 1.0).abs())
//!     }
//!
//!     fn after_evaluation(&self, history: &[Observation]) -> ControlFlow<()> {
//!         match history.last() {
//!             Some(o) if o.value < self.target => ControlFlow::Break(()),
//!             _ => ControlFlow::Continue(()),
//!         }
//!     }
//! }
//!
//! let space = SearchSpace::builder().continuous("x", 0.0, 2.0).build().unwrap();
//! let mut optimizer = Optimizer::builder(space)
//!     .n_initial_points(200)
//!     .n_calls(200)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let result = optimizer.run(StopBelow { target: 0.5 }).unwrap();
//! assert!(result.n_evaluations() < 200);
//! assert!(result.best_value().unwrap() < 0.5);
//! ```

use core::ops::ControlFlow;

use crate::candidate::Candidate;
use crate::optimizer::Observation;

/// An expensive black-box function to minimize, with an optional
/// early-stopping hook.
///
/// The only required method is [`evaluate`](Objective::evaluate). Closures
/// `Fn(&Candidate) -> Result<f64, E>` implement the trait through a blanket
/// impl.
///
/// # Thread safety
///
/// [`Optimizer::run_async`](crate::Optimizer::run_async) additionally
/// requires `Send + Sync + 'static` on the objective. The synchronous
/// [`run`](crate::Optimizer::run) has no thread-safety requirements.
pub trait Objective {
    /// The error type returned by [`evaluate`](Objective::evaluate).
    type Error: ToString + 'static;

    /// Evaluates the objective at `candidate`. Lower is better.
    ///
    /// # Errors
    ///
    /// Any error whose type implements `ToString`. Errors, as well as
    /// non-finite values, are handled by the optimizer's
    /// [`FailurePolicy`](crate::FailurePolicy).
    fn evaluate(&self, candidate: &Candidate) -> Result<f64, Self::Error>;

    /// Called after each observation is appended to the history.
    ///
    /// Return `ControlFlow::Break(())` to stop the run.
    ///
    /// Default: always continues.
    fn after_evaluation(&self, _history: &[Observation]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F, E> Objective for F
where
    F: Fn(&Candidate) -> Result<f64, E>,
    E: ToString + 'static,
{
    type Error = E;

    fn evaluate(&self, candidate: &Candidate) -> Result<f64, E> {
        self(candidate)
    }
}
