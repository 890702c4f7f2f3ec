//! Maximization of an acquisition function over a search space.

use super::AcquisitionOptimizer;
use crate::candidate::Candidate;
use crate::space::SearchSpace;

/// Initial compass-search step in the unit cube.
const INITIAL_STEP: f64 = 0.1;
/// The compass search stops once the step shrinks below this.
const MIN_STEP: f64 = 1e-3;
/// Upper bound on score evaluations per refinement.
const MAX_REFINE_EVALUATIONS: usize = 200;

/// A candidate together with its encoding and acquisition score.
#[derive(Clone, Debug)]
pub(crate) struct Scored {
    pub(crate) candidate: Candidate,
    pub(crate) x: Vec<f64>,
    pub(crate) score: f64,
}

fn sanitize(score: f64) -> f64 {
    if score.is_nan() { f64::NEG_INFINITY } else { score }
}

/// Scores random candidates (and optionally refines the best ones) and
/// returns them ordered from highest to lowest score.
///
/// Candidates are drawn from the space's priors and encoded, so discrete
/// and categorical coordinates always sit on valid grid points. Refined
/// points are decoded and re-encoded before their final scoring for the
/// same reason.
pub(crate) fn maximize(
    space: &SearchSpace,
    optimizer: AcquisitionOptimizer,
    score: impl Fn(&[f64]) -> f64,
    rng: &mut fastrand::Rng,
) -> Vec<Scored> {
    let n_points = match optimizer {
        AcquisitionOptimizer::Sampling { n_points }
        | AcquisitionOptimizer::LocalSearch { n_points, .. } => n_points,
    };

    let mut scored: Vec<Scored> = (0..n_points)
        .map(|_| {
            let candidate = space.sample_one(rng);
            let x = space.encode(&candidate);
            let value = sanitize(score(&x));
            Scored {
                candidate,
                x,
                score: value,
            }
        })
        .collect();
    sort_descending(&mut scored);

    if let AcquisitionOptimizer::LocalSearch { n_restarts, .. } = optimizer {
        let starts: Vec<Vec<f64>> = scored
            .iter()
            .take(n_restarts)
            .map(|s| s.x.clone())
            .collect();
        for start in starts {
            let refined = compass_search(&start, &score);
            let Ok(candidate) = space.from_numeric(&refined) else {
                continue;
            };
            let x = space.encode(&candidate);
            let value = sanitize(score(&x));
            scored.push(Scored {
                candidate,
                x,
                score: value,
            });
        }
        sort_descending(&mut scored);
    }

    scored
}

fn sort_descending(scored: &mut [Scored]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Coordinate-wise pattern search that halves its step whenever no
/// single-coordinate move improves the score. Stays inside `[0, 1]^d`.
fn compass_search(start: &[f64], score: &impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut x = start.to_vec();
    let mut best = sanitize(score(&x));
    let mut step = INITIAL_STEP;
    let mut evaluations = 0;

    while step >= MIN_STEP && evaluations < MAX_REFINE_EVALUATIONS {
        let mut improved = false;
        for i in 0..x.len() {
            for direction in [1.0, -1.0] {
                let old = x[i];
                let moved = (old + direction * step).clamp(0.0, 1.0);
                if (moved - old).abs() < f64::EPSILON {
                    continue;
                }
                x[i] = moved;
                let s = sanitize(score(&x));
                evaluations += 1;
                if s > best {
                    best = s;
                    improved = true;
                    break;
                }
                x[i] = old;
            }
        }
        if !improved {
            step *= 0.5;
        }
    }

    x
}
