use smbo::prelude::*;
use smbo::surrogate::Prediction;

fn space() -> SearchSpace {
    SearchSpace::builder()
        .continuous("x", 0.0, 10.0)
        .build()
        .unwrap()
}

fn at(x: f64) -> Candidate {
    space().candidate(vec![ParamValue::Float(x)]).unwrap()
}

/// Fails for every `x` above 8.
fn fragile(c: &Candidate) -> core::result::Result<f64, String> {
    let x = c.float("x").unwrap();
    if x > 8.0 {
        Err(format!("diverged at x = {x}"))
    } else {
        Ok(x)
    }
}

fn builder(policy: FailurePolicy) -> OptimizerBuilder {
    Optimizer::builder(space())
        .n_initial_points(4)
        .n_calls(6)
        .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 64 })
        .failure_policy(policy)
        .seed(12)
}

#[test]
fn abort_is_the_default_policy() {
    let mut opt = Optimizer::builder(space())
        .n_initial_points(4)
        .n_calls(6)
        .seed(12)
        .build()
        .unwrap();
    opt.enqueue(at(2.0)).unwrap();
    opt.enqueue(at(9.0)).unwrap();

    let err = opt.run(fragile).unwrap_err();
    match err {
        Error::ObjectiveEvaluation { index, message } => {
            assert_eq!(index, 1);
            assert_eq!(message, "diverged at x = 9");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(opt.n_evaluations(), 1);
    assert_eq!(opt.history()[0].candidate, at(2.0));
}

#[test]
fn penalty_replaces_the_failed_value() {
    let mut opt = builder(FailurePolicy::Penalty(1e3)).build().unwrap();
    opt.enqueue(at(9.5)).unwrap();

    let result = opt.run(fragile).unwrap();
    assert_eq!(result.n_evaluations(), 6);

    let first = &result.history()[0];
    assert_eq!(first.value, 1e3);
    assert!(first.status.is_penalized());
    assert!(
        result
            .history()
            .iter()
            .filter(|o| o.status.is_penalized())
            .all(|o| o.value == 1e3 && o.candidate.float("x").unwrap() > 8.0)
    );
}

#[test]
fn worst_observed_uses_the_largest_evaluated_value() {
    let mut opt = builder(FailurePolicy::WorstObserved { default: -1.0 })
        .build()
        .unwrap();
    for x in [9.0, 3.0, 7.5, 9.9] {
        opt.enqueue(at(x)).unwrap();
    }
    for _ in 0..4 {
        let c = opt.ask().unwrap();
        let outcome = fragile(&c);
        opt.tell(c, outcome).unwrap();
    }

    let values: Vec<f64> = opt.history().iter().map(|o| o.value).collect();
    // Nothing evaluated yet: the default. Later: the worst evaluated value.
    assert_eq!(values, vec![-1.0, 3.0, 7.5, 7.5]);
    assert!(opt.history()[0].status.is_penalized());
    assert!(opt.history()[3].status.is_penalized());
}

#[test]
fn non_finite_values_are_failures() {
    let mut opt = builder(FailurePolicy::Penalty(50.0)).build().unwrap();
    opt.enqueue(at(1.0)).unwrap();
    opt.enqueue(at(2.0)).unwrap();

    let c = opt.ask().unwrap();
    opt.tell(c, Ok::<_, String>(f64::NAN)).unwrap();
    let c = opt.ask().unwrap();
    opt.tell(c, Ok::<_, String>(f64::NEG_INFINITY)).unwrap();

    for o in opt.history() {
        assert_eq!(o.value, 50.0);
        match &o.status {
            EvaluationStatus::Penalized { reason } => assert!(reason.contains("non-finite")),
            EvaluationStatus::Evaluated => panic!("non-finite value recorded as evaluated"),
        }
    }
}

#[test]
fn non_finite_value_aborts_under_default_policy() {
    let mut opt = Optimizer::builder(space()).seed(0).build().unwrap();
    let c = opt.ask().unwrap();
    let err = opt.tell(c, Ok::<_, String>(f64::INFINITY)).unwrap_err();
    assert!(matches!(err, Error::ObjectiveEvaluation { index: 0, .. }));
    assert!(opt.history().is_empty());
}

#[test]
fn penalized_points_guide_the_model_away() {
    let space = SearchSpace::builder()
        .continuous("x", 0.0, 10.0)
        .build()
        .unwrap();
    let mut opt = Optimizer::builder(space)
        .n_initial_points(5)
        .n_calls(15)
        .failure_policy(FailurePolicy::Penalty(100.0))
        .seed(31)
        .build()
        .unwrap();

    let result = opt.run(fragile).unwrap();
    assert_eq!(result.n_evaluations(), 15);
    assert!(result.best_value().unwrap() < 1.0);
}

/// Never fits; predicts the uninformed prior everywhere.
struct BrokenSurrogate;

impl Surrogate for BrokenSurrogate {
    fn fit(&mut self, _x: &[Vec<f64>], _y: &[f64]) -> Result<()> {
        Err(Error::SurrogateFit("singular kernel matrix".to_owned()))
    }

    fn predict(&self, _x: &[f64]) -> Prediction {
        Prediction {
            mean: 0.0,
            std: 1.0,
        }
    }

    fn is_fitted(&self) -> bool {
        false
    }
}

#[test]
fn surrogate_fit_failure_falls_back_and_continues() {
    let mut opt = Optimizer::builder(
        SearchSpace::builder()
            .continuous("x", -1.0, 1.0)
            .build()
            .unwrap(),
    )
    .n_initial_points(3)
    .n_calls(8)
    .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 50 })
    .surrogate(BrokenSurrogate)
    .seed(4)
    .build()
    .unwrap();

    let result = opt
        .run(|c: &Candidate| Ok::<_, Error>(c.float("x").unwrap().abs()))
        .unwrap();

    assert_eq!(result.n_evaluations(), 8);
    assert_eq!(
        result
            .history()
            .iter()
            .filter(|o| o.source == Source::Model)
            .count(),
        5
    );
    assert!(!opt.surrogate().is_fitted());
}
