use smbo::prelude::*;

fn one_to_ten() -> SearchSpace {
    SearchSpace::builder().discrete("x", 1, 10).build().unwrap()
}

fn distance_to_seven(c: &Candidate) -> Result<f64> {
    let x = c.int("x").unwrap();
    Ok(((x - 7) * (x - 7)) as f64)
}

#[test]
fn discrete_run_finds_the_true_minimum() {
    for seed in [0, 1, 42] {
        let mut optimizer = Optimizer::builder(one_to_ten())
            .n_initial_points(3)
            .n_calls(10)
            .seed(seed)
            .build()
            .unwrap();

        let result = optimizer.run(distance_to_seven).unwrap();

        assert_eq!(result.history().len(), 10);
        assert_eq!(result.best_candidate().unwrap().int("x"), Some(7), "seed {seed}");
        assert_eq!(result.best_value().unwrap(), 0.0);
    }
}

#[test]
fn small_discrete_space_is_covered_without_duplicates() {
    let mut optimizer = Optimizer::builder(one_to_ten())
        .n_initial_points(3)
        .n_calls(10)
        .seed(9)
        .build()
        .unwrap();
    let result = optimizer.run(distance_to_seven).unwrap();

    let mut seen: Vec<i64> = result
        .history()
        .iter()
        .map(|o| o.candidate.int("x").unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (1..=10).collect::<Vec<_>>());
}

#[test]
fn initial_points_equal_to_calls_is_pure_random_search() {
    let space = SearchSpace::builder()
        .continuous("x", -3.0, 3.0)
        .categorical("kind", ["a", "b", "c"])
        .build()
        .unwrap();
    let mut optimizer = Optimizer::builder(space)
        .n_initial_points(5)
        .n_calls(5)
        .seed(3)
        .build()
        .unwrap();

    let mut phases = Vec::new();
    while let Ok(candidate) = optimizer.ask() {
        phases.push(optimizer.phase());
        let x = candidate.float("x").unwrap();
        optimizer.tell(candidate, Ok::<_, String>(x * x)).unwrap();
    }

    assert_eq!(phases, vec![Phase::Exploring; 5]);
    assert_eq!(optimizer.phase(), Phase::Terminated);
    assert_eq!(optimizer.history().len(), 5);
    assert!(optimizer.history().iter().all(|o| o.source == Source::Random));
    assert!(!optimizer.surrogate().is_fitted());
}

#[test]
fn failing_candidate_is_penalized_and_run_completes() {
    let space = one_to_ten();
    let mut optimizer = Optimizer::builder(space.clone())
        .n_initial_points(3)
        .n_calls(8)
        .failure_policy(FailurePolicy::Penalty(100.0))
        .seed(5)
        .build()
        .unwrap();
    let bad = space.candidate(vec![ParamValue::Int(4)]).unwrap();
    optimizer.enqueue(bad.clone()).unwrap();

    let result = optimizer
        .run(|c: &Candidate| {
            let x = c.int("x").unwrap();
            if x == 4 {
                Err(format!("cannot evaluate x = {x}"))
            } else {
                Ok(((x - 7) * (x - 7)) as f64)
            }
        })
        .unwrap();

    assert_eq!(result.history().len(), 8);
    let penalized: Vec<&Observation> = result
        .history()
        .iter()
        .filter(|o| o.candidate == bad)
        .collect();
    assert_eq!(penalized.len(), 1);
    assert_eq!(penalized[0].value, 100.0);
    assert_eq!(
        penalized[0].status,
        EvaluationStatus::Penalized {
            reason: "cannot evaluate x = 4".to_owned()
        }
    );
    assert!(
        result
            .history()
            .iter()
            .filter(|o| o.candidate != bad)
            .all(|o| o.status == EvaluationStatus::Evaluated)
    );
}

#[test]
fn more_calls_never_worsen_the_best_value() {
    let space = SearchSpace::builder()
        .continuous("x", -2.0, 2.0)
        .continuous("y", -2.0, 2.0)
        .build()
        .unwrap();
    let objective = |c: &Candidate| {
        let (x, y) = (c.float("x").unwrap(), c.float("y").unwrap());
        Ok::<_, Error>((x - 0.5).powi(2) + (y + 0.25).powi(2))
    };

    let mut previous: Option<OptimizeResult> = None;
    for n_calls in [4, 6, 9, 12] {
        let mut optimizer = Optimizer::builder(space.clone())
            .n_initial_points(3)
            .n_calls(n_calls)
            .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 200 })
            .seed(11)
            .build()
            .unwrap();
        let result = optimizer.run(objective).unwrap();

        if let Some(prev) = &previous {
            assert!(result.best_value().unwrap() <= prev.best_value().unwrap());
            assert_eq!(&result.history()[..prev.n_evaluations()], prev.history());
        }
        previous = Some(result);
    }
}

#[test]
fn best_is_the_minimum_of_the_history() {
    let space = SearchSpace::builder()
        .continuous("x", 0.0, 1.0)
        .build()
        .unwrap();
    let mut optimizer = Optimizer::builder(space)
        .n_initial_points(4)
        .n_calls(10)
        .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 100 })
        .seed(2)
        .build()
        .unwrap();
    let result = optimizer
        .run(|c: &Candidate| Ok::<_, Error>((c.float("x").unwrap() * 6.0).sin()))
        .unwrap();

    let best = result.best().unwrap();
    assert!(result.history().iter().all(|o| best.value <= o.value));
    assert_eq!(result.convergence().last().copied(), Some(best.value));
    assert!(
        result
            .convergence()
            .windows(2)
            .all(|w| w[1] <= w[0])
    );
}

#[test]
fn model_phase_improves_on_random_exploration() {
    let space = SearchSpace::builder()
        .continuous("x", -10.0, 10.0)
        .build()
        .unwrap();
    let mut optimizer = Optimizer::builder(space)
        .n_initial_points(5)
        .n_calls(20)
        .seed(21)
        .build()
        .unwrap();
    let result = optimizer
        .run(|c: &Candidate| Ok::<_, Error>((c.float("x").unwrap() - 3.0).powi(2)))
        .unwrap();

    let model: Vec<&Observation> = result
        .history()
        .iter()
        .filter(|o| o.source == Source::Model)
        .collect();
    assert_eq!(model.len(), 15);
    assert!(result.best_value().unwrap() < 0.1, "best {}", result.best_value().unwrap());
}

#[test]
fn constant_objective_still_completes() {
    let space = SearchSpace::builder()
        .continuous("x", 0.0, 1.0)
        .discrete("k", 0, 3)
        .build()
        .unwrap();
    let mut optimizer = Optimizer::builder(space)
        .n_initial_points(3)
        .n_calls(8)
        .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 50 })
        .seed(4)
        .build()
        .unwrap();
    let result = optimizer.run(|_: &Candidate| Ok::<_, Error>(1.0)).unwrap();

    assert_eq!(result.n_evaluations(), 8);
    assert_eq!(result.best().unwrap().candidate, result.history()[0].candidate);
}
