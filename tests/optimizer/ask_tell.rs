use smbo::prelude::*;

fn space() -> SearchSpace {
    SearchSpace::builder()
        .continuous("x", -4.0, 4.0)
        .discrete("n", 1, 6)
        .build()
        .unwrap()
}

fn objective(c: &Candidate) -> Result<f64> {
    let x = c.float("x").unwrap();
    let n = c.int("n").unwrap() as f64;
    Ok((x - 1.0).powi(2) + 0.5 * (n - 2.0).powi(2))
}

fn optimizer(seed: u64) -> Optimizer {
    Optimizer::builder(space())
        .n_initial_points(3)
        .n_calls(8)
        .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 150 })
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn manual_loop_matches_run() {
    let from_run = optimizer(17).run(objective).unwrap();

    let mut manual = optimizer(17);
    while let Ok(candidate) = manual.ask() {
        let value = objective(&candidate);
        manual.tell(candidate, value).unwrap();
    }

    assert_eq!(manual.history(), from_run.history());
}

#[test]
fn phases_progress_in_order() {
    let mut opt = optimizer(1);
    assert_eq!(opt.phase(), Phase::Initializing);

    let mut phases = Vec::new();
    while let Ok(candidate) = opt.ask() {
        phases.push(opt.phase());
        let value = objective(&candidate);
        opt.tell(candidate, value).unwrap();
    }

    assert_eq!(phases[..3], [Phase::Exploring; 3]);
    assert_eq!(phases[3..], [Phase::Exploiting; 5]);
    assert_eq!(opt.phase(), Phase::Terminated);

    let sources: Vec<Source> = opt.history().iter().map(|o| o.source).collect();
    assert_eq!(sources[..3], [Source::Random; 3]);
    assert_eq!(sources[3..], [Source::Model; 5]);
    assert!(opt.surrogate().is_fitted());
}

#[test]
fn ask_after_budget_is_terminated() {
    let mut opt = optimizer(2);
    for _ in 0..8 {
        let c = opt.ask().unwrap();
        let value = objective(&c);
        opt.tell(c, value).unwrap();
    }
    assert!(matches!(opt.ask(), Err(Error::Terminated)));

    let extra = space()
        .candidate(vec![ParamValue::Float(0.0), ParamValue::Int(1)])
        .unwrap();
    assert!(matches!(opt.tell(extra, Ok::<_, String>(1.0)), Err(Error::Terminated)));
    assert_eq!(opt.n_evaluations(), 8);
}

#[test]
fn tell_accepts_candidates_that_were_not_asked() {
    let mut opt = optimizer(3);
    let c = space()
        .candidate(vec![ParamValue::Float(1.0), ParamValue::Int(2)])
        .unwrap();
    opt.tell(c.clone(), Ok::<_, String>(0.0)).unwrap();

    let recorded = &opt.history()[0];
    assert_eq!(recorded.candidate, c);
    assert_eq!(recorded.source, Source::Enqueued);
    assert_eq!(opt.best().unwrap().value, 0.0);
}

#[test]
fn tell_rejects_candidates_from_another_space() {
    let mut opt = optimizer(4);

    let wider = SearchSpace::builder()
        .continuous("x", -100.0, 100.0)
        .discrete("n", 1, 6)
        .build()
        .unwrap();
    let outside = wider
        .candidate(vec![ParamValue::Float(50.0), ParamValue::Int(1)])
        .unwrap();
    assert!(matches!(
        opt.tell(outside, Ok::<_, String>(1.0)),
        Err(Error::CandidateOutOfDomain { ref dimension, .. }) if dimension == "x"
    ));

    let shorter = SearchSpace::builder()
        .continuous("x", -4.0, 4.0)
        .build()
        .unwrap();
    let short = shorter.candidate(vec![ParamValue::Float(0.0)]).unwrap();
    assert!(matches!(
        opt.tell(short, Ok::<_, String>(1.0)),
        Err(Error::DimensionMismatch {
            expected: 2,
            got: 1
        })
    ));

    assert!(opt.history().is_empty());
}

#[test]
fn asking_twice_replaces_the_pending_proposal() {
    let mut opt = optimizer(5);
    let first = opt.ask().unwrap();
    let second = opt.ask().unwrap();

    opt.tell(second.clone(), Ok::<_, String>(1.0)).unwrap();
    opt.tell(first.clone(), Ok::<_, String>(2.0)).unwrap();

    assert_eq!(opt.history()[0].source, Source::Random);
    assert_eq!(opt.history()[1].source, Source::Enqueued);
}

#[test]
fn best_is_unavailable_before_any_observation() {
    let opt = optimizer(6);
    assert!(matches!(opt.best(), Err(Error::NoObservations)));
    assert!(matches!(opt.result().best(), Err(Error::NoObservations)));
}

#[test]
fn terminate_stops_the_loop() {
    let mut opt = optimizer(7);
    let c = opt.ask().unwrap();
    opt.tell(c, Ok::<_, String>(3.0)).unwrap();
    opt.terminate();

    assert_eq!(opt.phase(), Phase::Terminated);
    assert!(matches!(opt.ask(), Err(Error::Terminated)));
    assert_eq!(opt.result().n_evaluations(), 1);
}
