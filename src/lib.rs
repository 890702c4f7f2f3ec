#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Sequential model-based optimization (SMBO) of expensive black-box
//! functions with a Gaussian Process surrogate.
//!
//! The optimizer spends a fixed budget of objective evaluations: a few
//! random points explore the search space, then a Gaussian Process is fitted
//! to everything observed so far and an acquisition function decides where
//! to evaluate next. The objective is always **minimized**; negate
//! "higher is better" metrics.
//!
//! # Getting Started
//!
//! ```
//! use smbo::prelude::*;
//!
//! let space = SearchSpace::builder()
//!     .continuous("x", -5.0, 5.0)
//!     .discrete("n", 0, 10)
//!     .build()
//!     .unwrap();
//!
//! let mut optimizer = Optimizer::builder(space)
//!     .n_initial_points(5)
//!     .n_calls(15)
//!     .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 200 })
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let result = optimizer
//!     .run(|c: &Candidate| {
//!         let x = c.float("x").unwrap();
//!         let n = c.int("n").unwrap() as f64;
//!         Ok::<_, Error>((x - 1.0).powi(2) + (n - 3.0).abs())
//!     })
//!     .unwrap();
//!
//! let best = result.best().unwrap();
//! println!("{} -> {:.4}", best.candidate, best.value);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchSpace`] | Ordered, named [`Dimension`]s: continuous (uniform or log-uniform), discrete, categorical. |
//! | [`Candidate`] | One value per dimension, looked up by name. |
//! | [`Optimizer`] | The SMBO loop: ask/tell, [`run`](Optimizer::run), [`Phase`] tracking, failure handling. |
//! | [`Surrogate`](surrogate::Surrogate) | Regression model of the objective; [`GaussianProcess`](surrogate::GaussianProcess) by default. |
//! | [`Acquisition`](acquisition::Acquisition) | EI, PI, LCB or the GP-Hedge portfolio. |
//! | [`OptimizeResult`] | History, best observation and convergence trace. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `async` | [`Optimizer::run_async`] on tokio's blocking pool, with per-evaluation timeouts | off |
//! | `serde` | `Serialize`/`Deserialize` on spaces, candidates, observations and results | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key optimization points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod acquisition;
mod candidate;
mod error;
mod normal;
pub mod objective;
pub mod optimizer;
mod param;
mod rng_util;
pub mod space;
pub mod surrogate;
mod types;

pub use candidate::Candidate;
pub use error::{Error, Result};
pub use objective::Objective;
pub use optimizer::{Observation, OptimizeResult, Optimizer, OptimizerBuilder};
pub use param::ParamValue;
pub use space::{Dimension, Prior, SearchSpace, SearchSpaceBuilder};
pub use types::{EvaluationStatus, FailurePolicy, Phase, Source};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use smbo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::acquisition::{Acquisition, AcquisitionOptimizer};
    pub use crate::candidate::Candidate;
    pub use crate::error::{Error, Result};
    pub use crate::objective::Objective;
    pub use crate::optimizer::{Observation, OptimizeResult, Optimizer, OptimizerBuilder};
    pub use crate::param::ParamValue;
    pub use crate::space::{Dimension, Prior, SearchSpace};
    pub use crate::surrogate::{GaussianProcess, Surrogate};
    pub use crate::types::{EvaluationStatus, FailurePolicy, Phase, Source};
}
