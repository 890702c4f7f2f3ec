use core::ops::ControlFlow;
use std::sync::Arc;

use crate::error::Error;
use crate::objective::Objective;
use crate::types::Phase;

use super::{OptimizeResult, Optimizer};

impl Optimizer {
    /// Run the optimization loop with every evaluation on tokio's blocking
    /// pool.
    ///
    /// Like [`run`](Self::run), but each evaluation is wrapped in
    /// [`spawn_blocking`](tokio::task::spawn_blocking), keeping the async
    /// runtime responsive for CPU-bound objectives. Evaluations still run one
    /// at a time. With an
    /// [`evaluation_timeout`](super::OptimizerBuilder::evaluation_timeout),
    /// an evaluation that overruns it is recorded as a failure; its thread
    /// cannot be cancelled and is left to finish in the background. A
    /// panicking evaluation is a failure as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectiveEvaluation`] if an evaluation fails under
    /// [`FailurePolicy::Abort`](crate::FailurePolicy::Abort).
    /// Returns [`Error::TaskError`] if a blocking task is cancelled by the
    /// runtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use smbo::prelude::*;
    ///
    /// # #[cfg(feature = "async")]
    /// # async fn example() -> smbo::Result<()> {
    /// let space = SearchSpace::builder().continuous("x", -1.0, 1.0).build()?;
    /// let mut optimizer = Optimizer::builder(space)
    ///     .n_initial_points(3)
    ///     .n_calls(5)
    ///     .evaluation_timeout(std::time::Duration::from_secs(5))
    ///     .build()?;
    ///
    /// let result = optimizer
    ///     .run_async(|c: &Candidate| Ok::<_, Error>(c.float("x").unwrap().abs()))
    ///     .await?;
    /// assert_eq!(result.n_evaluations(), 5);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_async<O>(&mut self, objective: O) -> crate::Result<OptimizeResult>
    where
        O: Objective + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "run_async",
            n_calls = self.config.n_calls,
            n_initial_points = self.config.n_initial_points
        )
        .entered();
        trace_info!(dimensions = self.space.len(), "optimization started");

        let objective = Arc::new(objective);

        while self.phase != Phase::Terminated {
            let candidate = self.ask()?;

            let obj = Arc::clone(&objective);
            let input = candidate.clone();
            let task = tokio::task::spawn_blocking(move || {
                obj.evaluate(&input).map_err(|e| e.to_string())
            });

            let joined = match self.config.evaluation_timeout {
                Some(limit) => match tokio::time::timeout(limit, task).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        trace_warn!(timeout = ?limit, "evaluation timed out");
                        Ok(Err(format!("evaluation timed out after {limit:?}")))
                    }
                },
                None => task.await,
            };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => Err(format!("evaluation panicked: {e}")),
                Err(e) => return Err(Error::TaskError(e.to_string())),
            };
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
