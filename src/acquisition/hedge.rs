//! GP-Hedge bookkeeping: a softmax portfolio over EI, PI and LCB.

use super::Acquisition;
use crate::surrogate::Surrogate;

/// Gains and last proposals of the three portfolio members.
#[derive(Clone, Debug)]
pub(crate) struct HedgePortfolio {
    members: [Acquisition; 3],
    eta: f64,
    gains: [f64; 3],
    last_proposals: Option<[Vec<f64>; 3]>,
}

impl HedgePortfolio {
    pub(crate) fn new(eta: f64, xi: f64, kappa: f64) -> Self {
        Self {
            members: [
                Acquisition::ExpectedImprovement { xi },
                Acquisition::ProbabilityOfImprovement { xi },
                Acquisition::LowerConfidenceBound { kappa },
            ],
            eta,
            gains: [0.0; 3],
            last_proposals: None,
        }
    }

    pub(crate) fn members(&self) -> &[Acquisition; 3] {
        &self.members
    }

    #[cfg(test)]
    pub(crate) fn gains(&self) -> [f64; 3] {
        self.gains
    }

    /// Rewards every member by the negated posterior mean at its previous
    /// proposal under the freshly refitted surrogate.
    pub(crate) fn update(&mut self, surrogate: &dyn Surrogate) {
        let Some(proposals) = self.last_proposals.take() else {
            return;
        };
        for (gain, x) in self.gains.iter_mut().zip(&proposals) {
            let mean = surrogate.predict(x).mean;
            if mean.is_finite() {
                *gain -= mean;
            }
        }
    }

    /// Remembers the encoded proposals of this round.
    pub(crate) fn record(&mut self, proposals: [Vec<f64>; 3]) {
        self.last_proposals = Some(proposals);
    }

    /// Selection probabilities, `softmax(eta * gains)`.
    pub(crate) fn probabilities(&self) -> [f64; 3] {
        let logits = self.gains.map(|g| self.eta * g);
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights = logits.map(|l| (l - max).exp());
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return [1.0 / 3.0; 3];
        }
        weights.map(|w| w / total)
    }

    /// Draws the index of the member whose proposal is evaluated.
    pub(crate) fn choose(&self, rng: &mut fastrand::Rng) -> usize {
        let probabilities = self.probabilities();
        let u = rng.f64();
        let mut cumulative = 0.0;
        for (i, p) in probabilities.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return i;
            }
        }
        probabilities.len() - 1
    }
}
