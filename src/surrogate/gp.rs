//! Gaussian Process regression surrogate.
//!
//! # Fitting
//!
//! 1. The most recent `max_train_points` observations are kept.
//! 2. Targets are standardized to zero mean and unit variance.
//! 3. An initial ARD lengthscale per input coordinate is taken from the
//!    spread of the training inputs (floored at `MIN_LENGTHSCALE`).
//! 4. Every combination of lengthscale scale factor and noise variance in
//!    a small fixed grid is tried; the one with the highest log marginal
//!    likelihood wins. A fixed `noise_variance` restricts the grid to that
//!    single value.
//!
//! The grid search keeps fitting deterministic and cheap (at most
//! `|factors| × |noise|` Cholesky factorizations of an `n × n` matrix),
//! which suits call budgets of tens to a few hundred evaluations.

use nalgebra::{DMatrix, DVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::kernel::Kernel;
use super::{Prediction, Surrogate};
use crate::error::{Error, Result};

/// Default cap on the number of training points.
const DEFAULT_MAX_TRAIN_POINTS: usize = 100;
/// Lower bound on the data-driven initial lengthscale.
const MIN_LENGTHSCALE: f64 = 0.05;
/// Multipliers applied to the initial lengthscales during model selection.
const LENGTHSCALE_FACTORS: [f64; 6] = [0.25, 0.5, 1.0, 2.0, 4.0, 8.0];
/// Candidate noise variances (standardized units) during model selection.
const NOISE_GRID: [f64; 4] = [1e-6, 1e-4, 1e-2, 1e-1];
/// Targets whose standard deviation falls below this are considered constant.
const MIN_TARGET_STD: f64 = 1e-12;
/// The kernel amplitude; targets are standardized so unit variance fits.
const SIGNAL_VARIANCE: f64 = 1.0;

/// Kernel hyperparameters selected by the last successful fit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hyperparameters {
    /// One lengthscale per encoded input coordinate.
    pub lengthscales: Vec<f64>,
    /// Kernel amplitude in standardized units.
    pub signal_variance: f64,
    /// Observation noise variance in standardized units.
    pub noise_variance: f64,
    /// Log marginal likelihood of the standardized targets.
    pub log_marginal_likelihood: f64,
}

type Cholesky = nalgebra::linalg::Cholesky<f64, nalgebra::Dyn>;

/// One successful factorization during model selection.
struct Factorization {
    cholesky: Cholesky,
    alpha: DVector<f64>,
    hyperparameters: Hyperparameters,
}

/// A factorized model ready for predictions.
struct FittedGp {
    /// Cholesky factor of `K + σ²I`.
    cholesky: Cholesky,
    /// `(K + σ²I)⁻¹ y`.
    alpha: DVector<f64>,
    x_train: Vec<Vec<f64>>,
    hyperparameters: Hyperparameters,
    y_mean: f64,
    y_std: f64,
}

enum State {
    /// No usable data: predictions come from the prior.
    Prior { mean: f64, std: f64 },
    Fitted(Box<FittedGp>),
}

/// Gaussian Process surrogate with a stationary kernel.
///
/// # Examples
///
/// ```
/// use smbo::surrogate::{GaussianProcess, Kernel, Surrogate};
///
/// let mut gp = GaussianProcess::builder()
///     .kernel(Kernel::Matern52)
///     .noise_variance(1e-6)
///     .build();
/// assert!(!gp.is_fitted());
///
/// let x = vec![vec![0.0], vec![0.5], vec![1.0]];
/// let y = vec![1.0, 0.0, 1.0];
/// gp.fit(&x, &y).unwrap();
///
/// let at_data = gp.predict(&[0.5]);
/// assert!((at_data.mean - 0.0).abs() < 0.1);
/// assert!(at_data.std < 0.1);
/// ```
pub struct GaussianProcess {
    kernel: Kernel,
    noise_variance: Option<f64>,
    max_train_points: usize,
    state: State,
}

impl GaussianProcess {
    /// Creates a GP with the Matérn 5/2 kernel and fitted noise.
    #[must_use]
    pub fn new() -> Self {
        GaussianProcessBuilder::new().build()
    }

    /// Creates a builder for configuring a `GaussianProcess`.
    #[must_use]
    pub fn builder() -> GaussianProcessBuilder {
        GaussianProcessBuilder::new()
    }

    /// The kernel in use.
    #[must_use]
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Hyperparameters of the current fit, or `None` in the prior state.
    #[must_use]
    pub fn hyperparameters(&self) -> Option<&Hyperparameters> {
        match &self.state {
            State::Fitted(m) => Some(&m.hyperparameters),
            State::Prior { .. } => None,
        }
    }

    /// Number of training points in the current fit.
    #[must_use]
    pub fn n_train(&self) -> usize {
        match &self.state {
            State::Fitted(m) => m.x_train.len(),
            State::Prior { .. } => 0,
        }
    }

    fn reset(&mut self, mean: f64, std: f64) {
        self.state = State::Prior { mean, std };
    }
}

impl Default for GaussianProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for GaussianProcess {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GaussianProcess")
            .field("kernel", &self.kernel)
            .field("noise_variance", &self.noise_variance)
            .field("max_train_points", &self.max_train_points)
            .field("n_train", &self.n_train())
            .field("hyperparameters", &self.hyperparameters())
            .finish()
    }
}

/// Builder for configuring a [`GaussianProcess`].
///
/// Defaults:
/// - `kernel`: [`Kernel::Matern52`]
/// - `noise_variance`: selected by marginal likelihood
/// - `max_train_points`: 100
#[derive(Clone, Debug, Default)]
pub struct GaussianProcessBuilder {
    kernel: Option<Kernel>,
    noise_variance: Option<f64>,
    max_train_points: Option<usize>,
}

impl GaussianProcessBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the covariance kernel.
    #[must_use]
    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Fixes the observation noise variance (standardized units) instead of
    /// selecting it from the data.
    #[must_use]
    pub fn noise_variance(mut self, v: f64) -> Self {
        self.noise_variance = Some(v);
        self
    }

    /// Caps the number of (most recent) observations used for fitting.
    #[must_use]
    pub fn max_train_points(mut self, n: usize) -> Self {
        self.max_train_points = Some(n);
        self
    }

    /// Builds the configured [`GaussianProcess`].
    #[must_use]
    pub fn build(self) -> GaussianProcess {
        GaussianProcess {
            kernel: self.kernel.unwrap_or_default(),
            noise_variance: self.noise_variance,
            max_train_points: self.max_train_points.unwrap_or(DEFAULT_MAX_TRAIN_POINTS).max(1),
            state: State::Prior {
                mean: 0.0,
                std: 1.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

fn kernel_matrix(
    kernel: Kernel,
    x: &[Vec<f64>],
    lengthscales: &[f64],
    noise_var: f64,
) -> DMatrix<f64> {
    let n = x.len();
    DMatrix::from_fn(n, n, |i, j| {
        let k = kernel.eval(&x[i], &x[j], lengthscales, SIGNAL_VARIANCE);
        if i == j { k + noise_var } else { k }
    })
}

fn kernel_vector(
    kernel: Kernel,
    x_star: &[f64],
    x_train: &[Vec<f64>],
    lengthscales: &[f64],
) -> DVector<f64> {
    DVector::from_fn(x_train.len(), |i, _| {
        kernel.eval(x_star, &x_train[i], lengthscales, SIGNAL_VARIANCE)
    })
}

/// Mean and sample standard deviation; a single value gets unit spread.
#[allow(clippy::cast_precision_loss)]
fn mean_std(y: &[f64]) -> (f64, f64) {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    if y.len() < 2 {
        return (mean, 1.0);
    }
    let var = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Per-coordinate spread of the inputs, used as the initial lengthscale.
#[allow(clippy::cast_precision_loss)]
fn initial_lengthscales(x: &[Vec<f64>]) -> Vec<f64> {
    let n = x.len() as f64;
    let d = x.first().map_or(0, Vec::len);
    (0..d)
        .map(|j| {
            let mean = x.iter().map(|row| row[j]).sum::<f64>() / n;
            let var = x.iter().map(|row| (row[j] - mean).powi(2)).sum::<f64>() / n;
            var.sqrt().max(MIN_LENGTHSCALE)
        })
        .collect()
}

/// Factorize `K + σ²I` and compute the log marginal likelihood.
#[allow(clippy::cast_precision_loss)]
fn try_factorize(
    kernel: Kernel,
    x: &[Vec<f64>],
    y: &DVector<f64>,
    lengthscales: Vec<f64>,
    noise_var: f64,
) -> Option<Factorization> {
    let k = kernel_matrix(kernel, x, &lengthscales, noise_var);
    let cholesky = Cholesky::new(k)?;
    let alpha = cholesky.solve(y);

    let log_det: f64 = cholesky.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>() * 2.0;
    let n = y.len() as f64;
    let lml = -0.5 * y.dot(&alpha) - 0.5 * log_det - 0.5 * n * (2.0 * core::f64::consts::PI).ln();
    if !lml.is_finite() {
        return None;
    }

    Some(Factorization {
        cholesky,
        alpha,
        hyperparameters: Hyperparameters {
            lengthscales,
            signal_variance: SIGNAL_VARIANCE,
            noise_variance: noise_var,
            log_marginal_likelihood: lml,
        },
    })
}

fn check_training_data(x: &[Vec<f64>], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::SurrogateFit(format!(
            "{} inputs but {} targets",
            x.len(),
            y.len()
        )));
    }
    let d = x.first().map_or(0, Vec::len);
    if x.iter().any(|row| row.len() != d) {
        return Err(Error::SurrogateFit("inputs have inconsistent lengths".to_owned()));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::SurrogateFit("training data contains non-finite values".to_owned()));
    }
    Ok(())
}

impl Surrogate for GaussianProcess {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if let Err(e) = check_training_data(x, y) {
            self.reset(0.0, 1.0);
            return Err(e);
        }
        if y.is_empty() {
            self.reset(0.0, 1.0);
            return Ok(());
        }

        let start = y.len().saturating_sub(self.max_train_points);
        let (x, y) = (&x[start..], &y[start..]);

        let (y_mean, y_std) = mean_std(y);
        if y_std < MIN_TARGET_STD {
            self.reset(y_mean, 1.0);
            return Err(Error::SurrogateFit(
                "observed values have zero variance".to_owned(),
            ));
        }
        let y_vec = DVector::from_iterator(y.len(), y.iter().map(|v| (v - y_mean) / y_std));

        let base = initial_lengthscales(x);
        let noise_grid: &[f64] = match &self.noise_variance {
            Some(v) => core::slice::from_ref(v),
            None => &NOISE_GRID,
        };

        let mut best: Option<Factorization> = None;
        for &factor in &LENGTHSCALE_FACTORS {
            for &noise in noise_grid {
                let lengthscales = base.iter().map(|l| l * factor).collect();
                let Some(candidate) = try_factorize(self.kernel, x, &y_vec, lengthscales, noise)
                else {
                    continue;
                };
                let better = best.as_ref().is_none_or(|b| {
                    candidate.hyperparameters.log_marginal_likelihood
                        > b.hyperparameters.log_marginal_likelihood
                });
                if better {
                    best = Some(candidate);
                }
            }
        }

        let Some(Factorization {
            cholesky,
            alpha,
            hyperparameters,
        }) = best
        else {
            self.reset(y_mean, y_std);
            return Err(Error::SurrogateFit(
                "kernel matrix is not positive definite for any hyperparameter setting".to_owned(),
            ));
        };

        trace_debug!(
            n_train = y.len(),
            noise = hyperparameters.noise_variance,
            lml = hyperparameters.log_marginal_likelihood,
            "gaussian process fitted"
        );

        self.state = State::Fitted(Box::new(FittedGp {
            cholesky,
            alpha,
            x_train: x.to_vec(),
            hyperparameters,
            y_mean,
            y_std,
        }));
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Prediction {
        match &self.state {
            State::Prior { mean, std } => Prediction {
                mean: *mean,
                std: *std,
            },
            State::Fitted(model) => {
                let h = &model.hyperparameters;
                let k_star = kernel_vector(self.kernel, x, &model.x_train, &h.lengthscales);

                let mean = k_star.dot(&model.alpha);
                let v = model.cholesky.solve(&k_star);
                let var = (h.signal_variance - k_star.dot(&v)).max(0.0);

                Prediction {
                    mean: model.y_mean + model.y_std * mean,
                    std: model.y_std * var.sqrt(),
                }
            }
        }
    }

    fn is_fitted(&self) -> bool {
        matches!(self.state, State::Fitted(_))
    }
}
