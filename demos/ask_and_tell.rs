//! Ask-and-tell interface: decouple proposing from evaluating.
//!
//! `ask()` returns the next candidate, you evaluate it however you like
//! (a worker pool, a cluster job, a lab experiment), then `tell()` the
//! outcome. Known-good configurations can be queued with `enqueue()` and
//! are evaluated before anything else.
//!
//! Run with: `cargo run --example ask_and_tell`

use smbo::prelude::*;

fn main() -> smbo::Result<()> {
    let space = SearchSpace::builder()
        .continuous("x", -5.0, 5.0)
        .continuous("y", -5.0, 5.0)
        .build()?;

    let mut optimizer = Optimizer::builder(space.clone())
        .n_initial_points(6)
        .n_calls(20)
        .seed(11)
        .build()?;

    // A hunch from a previous experiment.
    optimizer.enqueue(space.candidate(vec![ParamValue::Float(1.0), ParamValue::Float(1.0)])?)?;

    while optimizer.phase() != Phase::Terminated {
        let candidate = optimizer.ask()?;
        let x = candidate.float("x").unwrap_or_default();
        let y = candidate.float("y").unwrap_or_default();

        // Evaluate externally. Results may also be errors.
        let value = (x - 1.5).powi(2) + (y + 0.5).powi(2);
        optimizer.tell(candidate, Ok::<_, &str>(value))?;

        let last = &optimizer.history()[optimizer.n_evaluations() - 1];
        println!(
            "#{:<2} {:?} {:<10} -> {:.4}",
            optimizer.n_evaluations(),
            optimizer.phase(),
            format!("{:?}", last.source),
            last.value,
        );
    }

    let best = optimizer.best()?;
    println!("Best: {} = {:.6}", best.candidate, best.value);

    Ok(())
}
