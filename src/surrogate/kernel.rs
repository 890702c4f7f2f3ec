//! Stationary covariance kernels with ARD lengthscales.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Covariance kernel of a [`GaussianProcess`](super::GaussianProcess).
///
/// All kernels are stationary and use one lengthscale per input
/// coordinate (automatic relevance determination):
/// `r = sqrt(Σ ((a_i - b_i) / l_i)²)`.
///
/// The Matérn family trades smoothness for robustness: ν = 1/2 gives
/// rough, continuous sample paths, ν = 5/2 twice-differentiable ones, and
/// the squared exponential (ν → ∞) infinitely smooth ones. Hyperparameter
/// response surfaces are rarely that smooth, hence the Matérn 5/2 default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kernel {
    /// Matérn ν = 1/2 (exponential kernel): `exp(-r)`.
    Matern12,
    /// Matérn ν = 3/2: `(1 + √3 r) exp(-√3 r)`.
    Matern32,
    /// Matérn ν = 5/2: `(1 + √5 r + 5/3 r²) exp(-√5 r)`.
    #[default]
    Matern52,
    /// Squared exponential (RBF): `exp(-r² / 2)`.
    SquaredExponential,
}

impl Kernel {
    /// Covariance between `a` and `b`.
    ///
    /// `a`, `b` and `lengthscales` must have the same length.
    #[must_use]
    pub fn eval(self, a: &[f64], b: &[f64], lengthscales: &[f64], signal_variance: f64) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), lengthscales.len());
        let r_sq: f64 = a
            .iter()
            .zip(b)
            .zip(lengthscales)
            .map(|((x1, x2), l)| {
                let d = (x1 - x2) / l;
                d * d
            })
            .sum();
        signal_variance * self.correlation(r_sq)
    }

    /// Correlation as a function of the squared scaled distance.
    fn correlation(self, r_sq: f64) -> f64 {
        match self {
            Self::Matern12 => (-r_sq.sqrt()).exp(),
            Self::Matern32 => {
                let s = 3f64.sqrt() * r_sq.sqrt();
                (1.0 + s) * (-s).exp()
            }
            Self::Matern52 => {
                let s = 5f64.sqrt() * r_sq.sqrt();
                (1.0 + s + 5.0 / 3.0 * r_sq) * (-s).exp()
            }
            Self::SquaredExponential => (-0.5 * r_sq).exp(),
        }
    }
}
