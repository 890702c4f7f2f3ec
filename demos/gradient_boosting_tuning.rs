//! Hyperparameter tuning of a simulated gradient boosting model.
//!
//! The search space mixes a log-scaled learning rate, an integer tree depth,
//! a sampled fraction and a categorical loss function. The objective stands
//! in for an expensive train-and-validate cycle, so every evaluation counts:
//! a Gaussian-process surrogate with GP-Hedge decides where to look next.
//!
//! Run with: `cargo run --example gradient_boosting_tuning`
//! (add `--features tracing` and a subscriber to see phase transitions)

use core::ops::ControlFlow;

use smbo::prelude::*;

struct BoostingConfig<'a> {
    learning_rate: f64,
    max_depth: i64,
    subsample: f64,
    loss: &'a str,
}

impl<'a> BoostingConfig<'a> {
    fn from_candidate(c: &'a Candidate) -> Option<Self> {
        Some(Self {
            learning_rate: c.float("learning_rate")?,
            max_depth: c.int("max_depth")?,
            subsample: c.float("subsample")?,
            loss: c.category("loss")?,
        })
    }
}

/// Simulated validation loss. Best around lr 0.05, depth 6, subsample 0.8
/// with the log loss.
#[allow(clippy::cast_precision_loss)]
fn validation_loss(config: &BoostingConfig<'_>) -> core::result::Result<f64, String> {
    if config.max_depth > 10 && config.learning_rate > 0.3 {
        // Deep trees with a large step diverge.
        return Err(format!(
            "training diverged (depth {}, lr {:.3})",
            config.max_depth, config.learning_rate
        ));
    }
    let lr = (config.learning_rate.log10() - 0.05_f64.log10()).powi(2);
    let depth = 0.02 * ((config.max_depth - 6) as f64).powi(2);
    let subsample = 0.5 * (config.subsample - 0.8).powi(2);
    let loss = match config.loss {
        "log_loss" => 0.0,
        "exponential" => 0.04,
        _ => 0.1,
    };
    Ok(0.12 + lr + depth + subsample + loss)
}

struct Tuning {
    target: f64,
}

impl Objective for Tuning {
    type Error = String;

    fn evaluate(&self, candidate: &Candidate) -> core::result::Result<f64, String> {
        let config =
            BoostingConfig::from_candidate(candidate).ok_or("candidate is missing a parameter")?;
        validation_loss(&config)
    }

    fn after_evaluation(&self, history: &[Observation]) -> ControlFlow<()> {
        match history.last() {
            Some(o) if o.value <= self.target => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

fn main() -> smbo::Result<()> {
    let space = SearchSpace::builder()
        .log_uniform("learning_rate", 1e-3, 1.0)
        .discrete("max_depth", 2, 16)
        .continuous("subsample", 0.5, 1.0)
        .categorical("loss", ["log_loss", "exponential", "huber"])
        .build()?;

    let mut optimizer = Optimizer::builder(space)
        .n_initial_points(8)
        .n_calls(40)
        .acquisition(Acquisition::hedge())
        .failure_policy(FailurePolicy::WorstObserved { default: 1.0 })
        .seed(2024)
        .build()?;

    let result = optimizer.run(Tuning { target: 0.125 })?;

    let failures = result
        .history()
        .iter()
        .filter(|o| o.status.is_penalized())
        .count();
    println!(
        "{} evaluations ({failures} failed), stopped in phase {:?}",
        result.n_evaluations(),
        optimizer.phase()
    );

    for (i, best) in result.convergence().iter().enumerate().step_by(5) {
        println!("  after {:>2}: best so far {best:.5}", i + 1);
    }

    let best = result.best()?;
    println!("Best configuration: {}", best.candidate);
    println!("Validation loss:    {:.5}", best.value);

    Ok(())
}
