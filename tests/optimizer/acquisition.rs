use smbo::prelude::*;
use smbo::surrogate::{GaussianProcess, Kernel};

fn space() -> SearchSpace {
    SearchSpace::builder()
        .continuous("x", -3.0, 3.0)
        .continuous("y", -3.0, 3.0)
        .build()
        .unwrap()
}

fn bowl(c: &Candidate) -> Result<f64> {
    let x = c.float("x").unwrap();
    let y = c.float("y").unwrap();
    Ok((x - 1.0).powi(2) + (y + 0.5).powi(2))
}

fn run_with(acquisition: Acquisition, seed: u64) -> OptimizeResult {
    let mut opt = Optimizer::builder(space())
        .n_initial_points(5)
        .n_calls(15)
        .acquisition(acquisition)
        .acquisition_optimizer(AcquisitionOptimizer::LocalSearch {
            n_points: 300,
            n_restarts: 3,
        })
        .seed(seed)
        .build()
        .unwrap();
    opt.run(bowl).unwrap()
}

fn random_search(seed: u64) -> OptimizeResult {
    let mut opt = Optimizer::builder(space())
        .n_initial_points(15)
        .n_calls(15)
        .seed(seed)
        .build()
        .unwrap();
    opt.run(bowl).unwrap()
}

#[test]
fn every_acquisition_function_completes_the_budget() {
    for acquisition in [
        Acquisition::ei(),
        Acquisition::pi(),
        Acquisition::lcb(),
        Acquisition::hedge(),
    ] {
        let result = run_with(acquisition, 4);
        assert_eq!(result.n_evaluations(), 15, "{acquisition:?}");
        assert!(
            result.history()[5..]
                .iter()
                .all(|o| o.source == Source::Model),
            "{acquisition:?}"
        );
    }
}

#[test]
fn expected_improvement_beats_random_search() {
    let mut wins = 0;
    for seed in 0..5 {
        let model = run_with(Acquisition::ei(), seed).best_value().unwrap();
        let random = random_search(seed).best_value().unwrap();
        if model <= random {
            wins += 1;
        }
    }
    assert!(wins >= 4, "EI won {wins} of 5");
}

#[test]
fn hedge_finds_the_basin() {
    let result = run_with(Acquisition::hedge(), 13);
    assert!(result.best_value().unwrap() < 0.5, "best {}", result.best_value().unwrap());
}

#[test]
fn model_proposals_stay_in_the_space() {
    let space = SearchSpace::builder()
        .log_uniform("lr", 1e-4, 1.0)
        .discrete("depth", 2, 9)
        .categorical("booster", ["gbtree", "dart", "linear"])
        .build()
        .unwrap();
    let mut opt = Optimizer::builder(space.clone())
        .n_initial_points(4)
        .n_calls(10)
        .surrogate(GaussianProcess::builder().kernel(Kernel::Matern32).build())
        .seed(6)
        .build()
        .unwrap();

    let result = opt
        .run(|c: &Candidate| {
            let lr = c.float("lr").unwrap();
            let depth = c.int("depth").unwrap() as f64;
            let penalty = match c.category("booster").unwrap() {
                "dart" => 0.0,
                "gbtree" => 0.3,
                _ => 1.0,
            };
            Ok::<_, Error>((lr.log10() + 1.5).powi(2) + 0.1 * (depth - 6.0).powi(2) + penalty)
        })
        .unwrap();

    assert!(result.history().iter().all(|o| space.contains(&o.candidate)));
    assert_eq!(
        result
            .history()
            .iter()
            .filter(|o| o.source == Source::Model)
            .count(),
        6
    );
}
