use core::ops::ControlFlow;

use crate::objective::Objective;
use crate::types::Phase;

use super::{OptimizeResult, Optimizer};

impl Optimizer {
    /// Run the optimization loop until the call budget is spent.
    ///
    /// Accepts any [`Objective`] implementation, including plain closures
    /// (`Fn(&Candidate) -> Result<f64, E>`) thanks to the blanket impl.
    /// Struct-based objectives can override
    /// [`after_evaluation`](Objective::after_evaluation) to stop early.
    ///
    /// Each iteration is one [`ask`](Self::ask), one evaluation and one
    /// [`tell`](Self::tell), so a `run` and a hand-written ask/tell loop with
    /// the same seed produce the same history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectiveEvaluation`](crate::Error::ObjectiveEvaluation)
    /// if an evaluation fails under [`FailurePolicy::Abort`](crate::FailurePolicy::Abort).
    /// The observations recorded before the failure stay available via
    /// [`history`](Self::history).
    ///
    /// # Examples
    ///
    /// ```
    /// use smbo::prelude::*;
    ///
    /// let space = SearchSpace::builder()
    ///     .discrete("depth", 1, 8)
    ///     .categorical("loss", ["squared", "absolute"])
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut optimizer = Optimizer::builder(space)
    ///     .n_initial_points(4)
    ///     .n_calls(10)
    ///     .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 100 })
    ///     .seed(7)
    ///     .build()
    ///     .unwrap();
    ///
    /// let result = optimizer
    ///     .run(|c: &Candidate| {
    ///         let depth = c.int("depth").unwrap() as f64;
    ///         let loss = if c.category("loss") == Some("absolute") { 0.0 } else { 1.0 };
    ///         Ok::<_, Error>((depth - 5.0).abs() + loss)
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(result.n_evaluations(), 10);
    /// ```
    #[allow(clippy::needless_pass_by_value)]
    pub fn run(&mut self, objective: impl Objective) -> crate::Result<OptimizeResult> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "run",
            n_calls = self.config.n_calls,
            n_initial_points = self.config.n_initial_points
        )
        .entered();
        trace_info!(dimensions = self.space.len(), "optimization started");

        while self.phase != Phase::Terminated {
            let candidate = self.ask()?;
            let outcome = objective.evaluate(&candidate);
            self.tell(candidate, outcome)?;

            if let ControlFlow::Break(()) = objective.after_evaluation(&self.history) {
                trace_info!(n_evaluations = self.history.len(), "stopped early by objective");
                self.terminate();
            }
        }

        trace_info!(n_evaluations = self.history.len(), "optimization finished");
        Ok(self.result())
    }
}
